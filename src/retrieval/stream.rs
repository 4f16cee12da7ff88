// Lazy per-query results over a borrowed batch
use crate::errors::Result;
use crate::retrieval::loader::RetrievalLoader;
use crate::retrieval::types::{Query, RetrievalOutcome};

/// Finite iterator of `(index, result)`; each query runs when pulled
///
/// `restart_at` repositions the stream, so a consumer can resume after a
/// crash or replay a range without re-running earlier queries.
#[derive(Debug)]
pub struct RetrievalStream<'a> {
    loader: &'a RetrievalLoader,
    queries: &'a [Query],
    position: usize,
}

impl<'a> RetrievalStream<'a> {
    pub(crate) fn new(loader: &'a RetrievalLoader, queries: &'a [Query]) -> Self {
        Self {
            loader,
            queries,
            position: 0,
        }
    }

    /// Index of the next query to run
    pub fn position(&self) -> usize {
        self.position
    }

    /// Continue from `index`; past the end the stream is exhausted
    pub fn restart_at(&mut self, index: usize) {
        self.position = index.min(self.queries.len());
    }
}

impl Iterator for RetrievalStream<'_> {
    type Item = (usize, Result<RetrievalOutcome>);

    fn next(&mut self) -> Option<Self::Item> {
        let query = self.queries.get(self.position)?;
        let index = self.position;
        self.position += 1;
        Some((index, self.loader.retrieve_indexed(index, query, None)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.queries.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RetrievalStream<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, Node};
    use crate::retrieval::RetrievalConfig;

    fn loader() -> RetrievalLoader {
        let nodes = vec![Node::new(0, vec![1.0, 0.0]), Node::new(1, vec![0.0, 1.0])];
        RetrievalLoader::new(Graph::new(nodes, Vec::new()).unwrap(), RetrievalConfig::default())
            .unwrap()
    }

    fn queries() -> Vec<Query> {
        vec![
            Query::new(vec![1.0, 0.0]),
            Query::new(vec![0.0, 1.0]),
            Query::new(vec![-1.0, -1.0]),
        ]
    }

    #[test]
    fn test_stream_yields_in_order() {
        let loader = loader();
        let queries = queries();
        let results: Vec<_> = loader.stream(&queries).unwrap().collect();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, 0);
        let first = results[0].1.as_ref().unwrap().subgraph().unwrap();
        assert_eq!(first.id_map.node_originals(), &[0]);
        let second = results[1].1.as_ref().unwrap().subgraph().unwrap();
        assert_eq!(second.id_map.node_originals(), &[1]);
        assert!(results[2].1.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_restart_at() {
        let loader = loader();
        let queries = queries();
        let mut stream = loader.stream(&queries).unwrap();

        stream.next();
        stream.next();
        assert_eq!(stream.position(), 2);
        stream.restart_at(1);
        assert_eq!(stream.len(), 2);
        let (index, _) = stream.next().unwrap();
        assert_eq!(index, 1);

        stream.restart_at(10);
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_stream_rejects_bad_dimension() {
        let loader = loader();
        let queries = vec![Query::new(vec![1.0])];
        assert!(loader.stream(&queries).is_err());
    }

    #[test]
    fn test_stream_is_lazy() {
        let loader = loader();
        let queries = queries();
        let mut stream = loader.stream(&queries).unwrap();
        assert_eq!(loader.telemetry().get_stats().queries_started, 0);
        stream.next();
        assert_eq!(loader.telemetry().get_stats().queries_started, 1);
    }
}
