//! The fixed set of jobs offered by the platform.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A remote job type. Each one is a different agent on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobName {
    /// Literature search with concise, cited answers.
    Crow,
    /// Deep literature review producing long reports.
    Falcon,
    /// Precedent search: has anyone done this before?
    Owl,
    /// Chemistry and drug discovery.
    Phoenix,
}

impl JobName {
    /// Every known job, in listing order.
    pub const ALL: [JobName; 4] = [Self::Crow, Self::Falcon, Self::Owl, Self::Phoenix];

    /// Short lowercase name callers use.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crow => "crow",
            Self::Falcon => "falcon",
            Self::Owl => "owl",
            Self::Phoenix => "phoenix",
        }
    }

    /// Job identifier understood by the platform API.
    pub fn remote_id(&self) -> &'static str {
        match self {
            Self::Crow => "job-futurehouse-paperqa2",
            Self::Falcon => "job-futurehouse-paperqa2-deep",
            Self::Owl => "job-futurehouse-hasanyone",
            Self::Phoenix => "job-futurehouse-phoenix",
        }
    }

    /// One-line description of what the job is good at.
    pub fn specialty(&self) -> &'static str {
        match self {
            Self::Crow => "Quick literature search with concise, cited answers",
            Self::Falcon => "Deep literature review producing long-form reports",
            Self::Owl => "Precedent search: has anyone done this before?",
            Self::Phoenix => "Chemistry tasks and novel compound proposals with SMILES",
        }
    }

    /// Describe this job for listings.
    pub fn descriptor(&self) -> JobDescriptor {
        JobDescriptor {
            name: *self,
            remote_id: self.remote_id().to_string(),
            specialty: self.specialty().to_string(),
        }
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobName {
    type Err = CoreError;

    /// Accepts the short name in any case, or the remote job identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|job| {
                needle.eq_ignore_ascii_case(job.as_str()) || needle == job.remote_id()
            })
            .ok_or_else(|| CoreError::InvalidJobName(s.to_string()))
    }
}

/// Listing entry for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Short job name.
    pub name: JobName,

    /// Platform job identifier.
    pub remote_id: String,

    /// What the job is for.
    pub specialty: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_names_any_case() {
        assert_eq!("crow".parse::<JobName>().unwrap(), JobName::Crow);
        assert_eq!("CROW".parse::<JobName>().unwrap(), JobName::Crow);
        assert_eq!(" Phoenix ".parse::<JobName>().unwrap(), JobName::Phoenix);
    }

    #[test]
    fn test_parse_remote_id() {
        assert_eq!(
            "job-futurehouse-hasanyone".parse::<JobName>().unwrap(),
            JobName::Owl
        );
    }

    #[test]
    fn test_parse_unknown() {
        for bad in ["", "eagle", "crow2", "job-futurehouse-dummy-env"] {
            assert_eq!(
                bad.parse::<JobName>(),
                Err(CoreError::InvalidJobName(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_remote_ids_are_distinct() {
        let mut ids: Vec<_> = JobName::ALL.iter().map(|j| j.remote_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), JobName::ALL.len());
    }
}
