//! Export job lifecycle and the files a completed export produces.
//!
//! Jobs move `Pending -> Running -> Done` (or `Failed`); both terminal
//! states are final and `completed_at` is stamped exactly once, on the
//! transition into a terminal state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::admin::AdminId;

/// Maximum length for an export type label.
pub const EXPORT_TYPE_MAX: usize = 50;
/// Maximum length for a stored file's type label.
pub const FILE_TYPE_MAX: usize = 50;
/// Maximum length for a stored file's description.
pub const FILE_DESCRIPTION_MAX: usize = 255;

/// Validation errors for export records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportValidationError {
    EmptyExportType,
    ExportTypeTooLong { max: usize },
    EmptyFileType,
    FileTypeTooLong { max: usize },
    DescriptionTooLong { max: usize },
    UnknownStatus,
}

impl fmt::Display for ExportValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyExportType => write!(f, "export type must not be empty"),
            Self::ExportTypeTooLong { max } => {
                write!(f, "export type must be at most {max} characters")
            }
            Self::EmptyFileType => write!(f, "file type must not be empty"),
            Self::FileTypeTooLong { max } => {
                write!(f, "file type must be at most {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::UnknownStatus => write!(f, "unknown export job status"),
        }
    }
}

impl std::error::Error for ExportValidationError {}

/// Attempted transition that the lifecycle does not allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJobTransitionError {
    from: ExportJobStatus,
    to: ExportJobStatus,
}

impl fmt::Display for ExportJobTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "export job cannot move from {} to {}",
            self.from, self.to
        )
    }
}

impl std::error::Error for ExportJobTransitionError {}

/// Stable export job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ExportJobId(Uuid);

impl ExportJobId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ExportJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable system file identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SystemFileId(Uuid);

impl SystemFileId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SystemFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated export type label, e.g. `"things_csv"`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExportType(String);

impl ExportType {
    /// Validate and construct an [`ExportType`].
    pub fn new(label: impl Into<String>) -> Result<Self, ExportValidationError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ExportValidationError::EmptyExportType);
        }
        if label.chars().count() > EXPORT_TYPE_MAX {
            return Err(ExportValidationError::ExportTypeTooLong {
                max: EXPORT_TYPE_MAX,
            });
        }
        Ok(Self(label))
    }
}

impl AsRef<str> for ExportType {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ExportType> for String {
    fn from(value: ExportType) -> Self {
        value.0
    }
}

impl TryFrom<String> for ExportType {
    type Error = ExportValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lifecycle state of an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportJobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl ExportJobStatus {
    /// Stable string form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether the status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for ExportJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportJobStatus {
    type Err = ExportValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            _ => Err(ExportValidationError::UnknownStatus),
        }
    }
}

/// Artefact produced by a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemFile {
    id: SystemFileId,
    admin_id: AdminId,
    file_type: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl SystemFile {
    /// Rehydrate a file record from stored components.
    pub fn new(
        id: SystemFileId,
        admin_id: AdminId,
        file_type: String,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            admin_id,
            file_type,
            description,
            created_at,
        }
    }

    /// Build a brand-new file record, validating the labels.
    pub fn create(
        admin_id: AdminId,
        file_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ExportValidationError> {
        let file_type = file_type.into();
        if file_type.trim().is_empty() {
            return Err(ExportValidationError::EmptyFileType);
        }
        if file_type.chars().count() > FILE_TYPE_MAX {
            return Err(ExportValidationError::FileTypeTooLong { max: FILE_TYPE_MAX });
        }
        let description = description.into();
        if description.chars().count() > FILE_DESCRIPTION_MAX {
            return Err(ExportValidationError::DescriptionTooLong {
                max: FILE_DESCRIPTION_MAX,
            });
        }
        Ok(Self::new(
            SystemFileId::random(),
            admin_id,
            file_type,
            description,
            Utc::now(),
        ))
    }

    /// Stable file identifier.
    pub fn id(&self) -> &SystemFileId {
        &self.id
    }

    /// The administrator the export ran for.
    pub fn admin_id(&self) -> &AdminId {
        &self.admin_id
    }

    /// Kind of file, e.g. `"csv"`.
    pub fn file_type(&self) -> &str {
        self.file_type.as_str()
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A requested export and its progress through the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    id: ExportJobId,
    admin_id: AdminId,
    export_type: ExportType,
    status: ExportJobStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    file_id: Option<SystemFileId>,
}

impl ExportJob {
    /// Rehydrate a job from stored components.
    pub fn new(
        id: ExportJobId,
        admin_id: AdminId,
        export_type: ExportType,
        status: ExportJobStatus,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        file_id: Option<SystemFileId>,
    ) -> Self {
        Self {
            id,
            admin_id,
            export_type,
            status,
            created_at,
            completed_at,
            file_id,
        }
    }

    /// Build a brand-new pending job for the given administrator.
    pub fn create(admin_id: AdminId, export_type: ExportType) -> Self {
        Self::new(
            ExportJobId::random(),
            admin_id,
            export_type,
            ExportJobStatus::Pending,
            Utc::now(),
            None,
            None,
        )
    }

    /// Job identifier.
    pub fn id(&self) -> &ExportJobId {
        &self.id
    }

    /// The requesting administrator.
    pub fn admin_id(&self) -> &AdminId {
        &self.admin_id
    }

    /// What is being exported.
    pub fn export_type(&self) -> &ExportType {
        &self.export_type
    }

    /// Current lifecycle state.
    pub fn status(&self) -> ExportJobStatus {
        self.status
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Completion timestamp, set exactly once on reaching a terminal state.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Artefact produced by a successful run.
    pub fn file_id(&self) -> Option<&SystemFileId> {
        self.file_id.as_ref()
    }

    /// Move `Pending -> Running`.
    pub fn start(&mut self) -> Result<(), ExportJobTransitionError> {
        self.transition(ExportJobStatus::Running)
    }

    /// Move `Running -> Done`, attaching the produced file.
    pub fn finish(&mut self, file_id: SystemFileId) -> Result<(), ExportJobTransitionError> {
        self.transition(ExportJobStatus::Done)?;
        self.file_id = Some(file_id);
        Ok(())
    }

    /// Move `Pending | Running -> Failed`.
    pub fn fail(&mut self) -> Result<(), ExportJobTransitionError> {
        self.transition(ExportJobStatus::Failed)
    }

    fn transition(&mut self, to: ExportJobStatus) -> Result<(), ExportJobTransitionError> {
        let allowed = matches!(
            (self.status, to),
            (ExportJobStatus::Pending, ExportJobStatus::Running)
                | (ExportJobStatus::Running, ExportJobStatus::Done)
                | (ExportJobStatus::Pending, ExportJobStatus::Failed)
                | (ExportJobStatus::Running, ExportJobStatus::Failed)
        );
        if !allowed {
            return Err(ExportJobTransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        if to.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }
}
