use std::fmt;
use std::str::FromStr;

/// Degree program an applicant applies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    Bachelors,
    Masters,
    Postgraduate,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Bachelors => "bachelors",
            Program::Masters => "masters",
            Program::Postgraduate => "postgraduate",
        }
    }
}

impl FromStr for Program {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bachelors" => Ok(Program::Bachelors),
            "masters" => Ok(Program::Masters),
            "postgraduate" => Ok(Program::Postgraduate),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow state of an application. Stored as free text; these are the
/// states the workflows themselves produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Submitted,
    DocsVerified,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::DocsVerified => "docs_verified",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(ApplicationStatus::Submitted),
            "docs_verified" => Some(ApplicationStatus::DocsVerified),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    /// Only undecided applications may be accepted.
    pub fn accept_allowed(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Submitted | ApplicationStatus::DocsVerified
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three named document slots of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Photo,
    Sign,
    Transcript,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Photo,
        DocumentKind::Sign,
        DocumentKind::Transcript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Photo => "photo",
            DocumentKind::Sign => "sign",
            DocumentKind::Transcript => "transcript",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(DocumentKind::Photo),
            "sign" => Ok(DocumentKind::Sign),
            "transcript" => Ok(DocumentKind::Transcript),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
