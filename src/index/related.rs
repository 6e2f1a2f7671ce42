use crate::catalog_store::ArtistId;
use crate::structures::Graph;

/// Weight of the edge between two artists sharing a category.
const SAME_CATEGORY_WEIGHT: f64 = 1.0;

/// Artist relationship graph. Artists of one category form a clique, so the
/// one-hop neighbourhood of an artist is exactly its category peers.
pub struct RelatedIndex {
    graph: Graph<ArtistId>,
}

impl Default for RelatedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RelatedIndex {
    pub fn new() -> Self {
        RelatedIndex {
            graph: Graph::undirected(),
        }
    }

    /// Adds the artist and links it to each of `peers`.
    pub fn add_artist<I: IntoIterator<Item = ArtistId>>(&mut self, artist_id: ArtistId, peers: I) {
        self.graph.add_vertex(artist_id);
        for peer in peers {
            if peer != artist_id {
                self.graph.add_edge(&artist_id, &peer, SAME_CATEGORY_WEIGHT);
            }
        }
    }

    pub fn remove_artist(&mut self, artist_id: ArtistId) -> bool {
        self.graph.remove_vertex(&artist_id)
    }

    /// Directly related artists, nearest first, never the artist itself.
    pub fn related(&self, artist_id: ArtistId, limit: usize) -> Vec<ArtistId> {
        self.graph
            .find_related(&artist_id, 1)
            .into_iter()
            .take(limit)
            .map(|r| r.vertex)
            .collect()
    }

    pub fn are_related(&self, a: ArtistId, b: ArtistId) -> bool {
        self.graph.has_edge(&a, &b)
    }

    pub fn artist_count(&self) -> usize {
        self.graph.vertex_count()
    }
}
