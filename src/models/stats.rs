//! Admin dashboard snapshot.

use serde::{Deserialize, Serialize, Serializer};

// == Metric ==
/// Outcome of one count query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Available(u64),
    /// The query failed or timed out
    Unavailable,
}

impl Metric {
    /// The count, or 0 when it could not be determined.
    pub fn value_or_zero(&self) -> u64 {
        match self {
            Metric::Available(n) => *n,
            Metric::Unavailable => 0,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available(_))
    }

    pub fn available(&self) -> Option<u64> {
        match self {
            Metric::Available(n) => Some(*n),
            Metric::Unavailable => None,
        }
    }
}

impl<E> From<Result<u64, E>> for Metric {
    fn from(result: Result<u64, E>) -> Self {
        result.map_or(Metric::Unavailable, Metric::Available)
    }
}

// == Stats Counts ==
/// Fully determined counts. This is the form kept in the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsCounts {
    pub pendientes: u64,
    pub publicados: u64,
    pub rechazados: u64,
    pub usuarios: u64,
}

// == Admin Stats ==
/// Moderation counts shown on the admin dashboard.
///
/// Serializes every metric as a number (0 when unavailable) plus an
/// `unavailable` list so clients can tell a real zero from a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminStats {
    /// Events awaiting review
    pub pendientes: Metric,
    /// Published events
    pub publicados: Metric,
    /// Rejected events
    pub rechazados: Metric,
    /// Registered profiles
    pub usuarios: Metric,
}

impl AdminStats {
    fn metrics(&self) -> [(&'static str, Metric); 4] {
        [
            ("pendientes", self.pendientes),
            ("publicados", self.publicados),
            ("rechazados", self.rechazados),
            ("usuarios", self.usuarios),
        ]
    }

    /// Names of the metrics that could not be determined.
    pub fn unavailable(&self) -> Vec<&'static str> {
        self.metrics()
            .into_iter()
            .filter(|(_, metric)| !metric.is_available())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.metrics().iter().all(|(_, m)| m.is_available())
    }

    /// The counts, only if every metric is available.
    pub fn complete_counts(&self) -> Option<StatsCounts> {
        Some(StatsCounts {
            pendientes: self.pendientes.available()?,
            publicados: self.publicados.available()?,
            rechazados: self.rechazados.available()?,
            usuarios: self.usuarios.available()?,
        })
    }

    /// Counts with unavailable metrics rendered as zero.
    pub fn counts_or_zero(&self) -> StatsCounts {
        StatsCounts {
            pendientes: self.pendientes.value_or_zero(),
            publicados: self.publicados.value_or_zero(),
            rechazados: self.rechazados.value_or_zero(),
            usuarios: self.usuarios.value_or_zero(),
        }
    }
}

impl From<StatsCounts> for AdminStats {
    fn from(counts: StatsCounts) -> Self {
        Self {
            pendientes: Metric::Available(counts.pendientes),
            publicados: Metric::Available(counts.publicados),
            rechazados: Metric::Available(counts.rechazados),
            usuarios: Metric::Available(counts.usuarios),
        }
    }
}

#[derive(Serialize)]
struct AdminStatsView {
    #[serde(flatten)]
    counts: StatsCounts,
    unavailable: Vec<&'static str>,
}

impl Serialize for AdminStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AdminStatsView {
            counts: self.counts_or_zero(),
            unavailable: self.unavailable(),
        }
        .serialize(serializer)
    }
}
