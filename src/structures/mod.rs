//! Generic containers backing the catalog indexes. None of them knows
//! anything about songs or artists.

mod bst;
mod graph;
mod hash_table;
mod heap;
mod linked_list;
mod queue;
mod stack;
mod trie;

pub use bst::BinarySearchTree;
pub use graph::{Edge, Graph, Reached};
pub use hash_table::HashTable;
pub use heap::{Heap, HeapEntry, HeapOrder};
pub use linked_list::{DoublyLinkedList, Iter as ListIter, NodeHandle};
pub use queue::BoundedQueue;
pub use stack::BoundedStack;
pub use trie::Trie;
