//! Identifier → [`LiteratureRecord`] resolution over an ordered chain of
//! metadata backends.
//!
//! Each backend is a [`MetadataStrategy`]. The chain is walked in order and
//! every strategy accepting the identifier is asked in turn. A strategy may
//! answer `Delegate(doi)` (a preprint that has since been published), which
//! restarts the walk with the published DOI so the registry's record wins.

use std::sync::Arc;

use async_trait::async_trait;
use mdpaper_core::{AppConfig, LiteratureRecord};
use tracing::{debug, warn};

use crate::arxiv::client::ArxivClient;
use crate::error::{Result, ScienceError};
use crate::http::ClientConfig;
use crate::identifiers::{Doi, PaperId};
use crate::sources::biorxiv::BioRxivSource;
use crate::sources::crossref::CrossRefSource;

/// Upper bound on `Delegate` hops for one identifier.
const MAX_DELEGATIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Registry,
    Preprint,
    Arxiv,
}

/// Which part of the chain may answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceHint {
    /// Classify the identifier and ask every strategy that accepts it.
    #[default]
    Auto,
    /// DOI registry only.
    Registry,
}

/// Outcome of asking one backend.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(LiteratureRecord),
    NotFound,
    /// The paper is better described under this DOI.
    Delegate(Doi),
}

#[async_trait]
pub trait MetadataStrategy: Send + Sync {
    fn kind(&self) -> SourceKind;
    fn accepts(&self, id: &PaperId) -> bool;
    async fn lookup(&self, id: &PaperId) -> Result<Lookup>;
}

/// Seam used by the note pipelines so they can run against fakes.
#[async_trait]
pub trait ResolveMetadata: Send + Sync {
    async fn resolve(&self, identifier: &str, hint: SourceHint) -> Result<LiteratureRecord>;
}

pub struct Resolver {
    strategies: Vec<Arc<dyn MetadataStrategy>>,
}

impl Resolver {
    /// Chain order: preprint servers, DOI registry, arXiv.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = ClientConfig::from(&config.network);
        let crossref = CrossRefSource::with_base_url(&config.sources.crossref_base_url, &client)?;
        let biorxiv = BioRxivSource::with_base_url(&config.sources.biorxiv_base_url, &client)?;
        let arxiv = ArxivClient::with_base_url(&config.sources.arxiv_base_url, &client)?;
        let strategies: Vec<Arc<dyn MetadataStrategy>> =
            vec![Arc::new(biorxiv), Arc::new(crossref), Arc::new(arxiv)];
        Ok(Self::with_strategies(strategies))
    }

    pub fn with_strategies(strategies: Vec<Arc<dyn MetadataStrategy>>) -> Self {
        Self { strategies }
    }

    fn allowed(&self, strategy: &dyn MetadataStrategy, hint: SourceHint) -> bool {
        match hint {
            SourceHint::Auto => true,
            SourceHint::Registry => strategy.kind() == SourceKind::Registry,
        }
    }

    async fn walk(&self, identifier: &str, hint: SourceHint) -> Result<LiteratureRecord> {
        let mut id = match hint {
            SourceHint::Auto => PaperId::classify(identifier)?,
            SourceHint::Registry => PaperId::Doi(Doi::parse(identifier)?),
        };
        let mut hint = hint;
        let mut delegations = 0;

        'chain: loop {
            let mut last_error = None;
            for strategy in &self.strategies {
                if !self.allowed(strategy.as_ref(), hint) || !strategy.accepts(&id) {
                    continue;
                }
                match strategy.lookup(&id).await {
                    Ok(Lookup::Found(record)) => return Ok(record),
                    Ok(Lookup::NotFound) => {
                        debug!("{:?} has no record for {id}", strategy.kind());
                    }
                    Ok(Lookup::Delegate(doi)) if delegations < MAX_DELEGATIONS => {
                        debug!("{id} is published as {}", doi.normalized);
                        delegations += 1;
                        id = PaperId::Doi(doi);
                        hint = SourceHint::Registry;
                        continue 'chain;
                    }
                    Ok(Lookup::Delegate(doi)) => {
                        warn!("too many delegations for {identifier}, ignoring {}", doi.normalized);
                    }
                    Err(err) => {
                        debug!("{:?} failed for {id}: {err}", strategy.kind());
                        last_error = Some(err);
                    }
                }
            }
            return Err(last_error.unwrap_or_else(|| ScienceError::IdentifierNotFound(id.to_string())));
        }
    }
}

#[async_trait]
impl ResolveMetadata for Resolver {
    async fn resolve(&self, identifier: &str, hint: SourceHint) -> Result<LiteratureRecord> {
        self.walk(identifier, hint)
            .await
            .map_err(|err| ScienceError::resolution(identifier, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use mdpaper_core::VenueType;

    struct Scripted {
        kind: SourceKind,
        answers: Mutex<Vec<Result<Lookup>>>,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(kind: SourceKind, answers: Vec<Result<Lookup>>) -> Arc<Self> {
            Arc::new(Self {
                kind,
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetadataStrategy for Scripted {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn accepts(&self, id: &PaperId) -> bool {
            match self.kind {
                SourceKind::Registry => id.doi().is_some(),
                SourceKind::Preprint => matches!(id, PaperId::Preprint(_)),
                SourceKind::Arxiv => matches!(id, PaperId::Arxiv(_)),
            }
        }

        async fn lookup(&self, id: &PaperId) -> Result<Lookup> {
            self.seen.lock().unwrap().push(id.to_string());
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                Ok(Lookup::NotFound)
            } else {
                answers.remove(0)
            }
        }
    }

    fn chain(strategies: &[&Arc<Scripted>]) -> Resolver {
        Resolver::with_strategies(
            strategies
                .iter()
                .map(|s| Arc::clone(*s) as Arc<dyn MetadataStrategy>)
                .collect(),
        )
    }

    fn record(title: &str) -> LiteratureRecord {
        LiteratureRecord {
            title: title.to_string(),
            authors: "Doe Jane".to_string(),
            venue: "V".to_string(),
            venue_short: "V".to_string(),
            venue_type: VenueType::Unknown,
            year: "2022".to_string(),
            url: "u".to_string(),
            pdf_link: None,
            cited_count: None,
            doi: None,
        }
    }

    #[tokio::test]
    async fn doi_goes_to_registry() {
        let preprint = Scripted::new(SourceKind::Preprint, vec![]);
        let registry = Scripted::new(SourceKind::Registry, vec![Ok(Lookup::Found(record("R")))]);
        let resolver = chain(&[&preprint, &registry]);

        let rec = resolver.resolve("10.1000/xyz", SourceHint::Auto).await.unwrap();
        assert_eq!(rec.title, "R");
        assert!(preprint.seen().is_empty());
        assert_eq!(registry.seen(), vec!["10.1000/xyz"]);
    }

    #[tokio::test]
    async fn published_preprint_delegates_to_registry() {
        let published = Doi::parse("10.1038/s41586-022-00001-1").unwrap();
        let preprint = Scripted::new(SourceKind::Preprint, vec![Ok(Lookup::Delegate(published))]);
        let registry = Scripted::new(SourceKind::Registry, vec![Ok(Lookup::Found(record("Journal version")))]);
        let resolver = chain(&[&preprint, &registry]);

        let rec = resolver
            .resolve("10.1101/2022.07.28.22277637", SourceHint::Auto)
            .await
            .unwrap();
        assert_eq!(rec.title, "Journal version");
        assert_eq!(registry.seen(), vec!["10.1038/s41586-022-00001-1"]);
    }

    #[tokio::test]
    async fn unknown_preprint_falls_back_to_registry() {
        let preprint = Scripted::new(SourceKind::Preprint, vec![Ok(Lookup::NotFound)]);
        let registry = Scripted::new(SourceKind::Registry, vec![Ok(Lookup::Found(record("R")))]);
        let resolver = chain(&[&preprint, &registry]);

        let rec = resolver
            .resolve("10.1101/2022.07.28.22277637", SourceHint::Auto)
            .await
            .unwrap();
        assert_eq!(rec.title, "R");
        assert_eq!(preprint.seen().len(), 1);
    }

    #[tokio::test]
    async fn registry_hint_skips_other_strategies() {
        let preprint = Scripted::new(SourceKind::Preprint, vec![Ok(Lookup::Found(record("P")))]);
        let registry = Scripted::new(SourceKind::Registry, vec![Ok(Lookup::Found(record("R")))]);
        let resolver = chain(&[&preprint, &registry]);

        let rec = resolver
            .resolve("10.1101/2022.07.28.22277637", SourceHint::Registry)
            .await
            .unwrap();
        assert_eq!(rec.title, "R");
        assert!(preprint.seen().is_empty());
    }

    #[tokio::test]
    async fn failure_carries_identifier() {
        let registry = Scripted::new(
            SourceKind::Registry,
            vec![Err(ScienceError::Parse("bad json".to_string()))],
        );
        let resolver = chain(&[&registry]);

        let err = resolver.resolve("10.1000/xyz", SourceHint::Auto).await.unwrap_err();
        match err {
            ScienceError::Resolution { identifier, source } => {
                assert_eq!(identifier, "10.1000/xyz");
                assert!(matches!(*source, ScienceError::Parse(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn nothing_found_is_not_found_error() {
        let arxiv = Scripted::new(SourceKind::Arxiv, vec![]);
        let resolver = chain(&[&arxiv]);
        let err = resolver.resolve("1706.03762", SourceHint::Auto).await.unwrap_err();
        match err {
            ScienceError::Resolution { source, .. } => {
                assert!(matches!(*source, ScienceError::IdentifierNotFound(_)))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unsupported_identifier_fails() {
        let resolver = Resolver::with_strategies(vec![]);
        let err = resolver.resolve("not an id", SourceHint::Auto).await.unwrap_err();
        assert!(err.to_string().contains("not an id"));
    }
}
