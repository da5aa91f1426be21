use std::fmt;

use serde::{Deserialize, Serialize};

/// Mimetypes the panel reports for archives it can extract
const ARCHIVE_MIMETYPES: &[&str] = &[
    "application/vnd.rar",
    "application/x-rar-compressed",
    "application/x-tar",
    "application/x-br",
    "application/x-bzip2",
    "application/gzip",
    "application/x-gzip",
    "application/x-lzip",
    "application/x-sz",
    "application/x-xz",
    "application/zstd",
    "application/zip",
    "application/x-7z-compressed",
];

/// Mimetypes too vague to classify on their own
const GENERIC_MIMETYPES: &[&str] = &["", "application/octet-stream"];

const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".tar.gz", ".tgz", ".zip", ".tar", ".gz", ".bz2", ".xz", ".zst", ".rar", ".7z",
];

/// One row of a directory listing
///
/// Entities are produced by the listing source and replaced wholesale on every
/// refresh. Nothing in this crate edits one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntity {
    /// File or folder name, unique within its directory
    pub name: String,
    /// Identity token used to match rows across listings
    pub key: String,
    /// Symbolic permissions, e.g. `-rw-r--r--`
    pub mode: String,
    /// Octal permission bits, e.g. `644`
    pub mode_bits: String,
    pub size: u64,
    pub is_file: bool,
    pub is_symlink: bool,
    pub mimetype: String,
}

impl FileEntity {
    /// Create a regular file entry with default metadata
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name.into(), true)
    }

    /// Create a directory entry with default metadata
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name.into(), false)
    }

    fn new(name: String, is_file: bool) -> Self {
        let (mode, mode_bits) = if is_file {
            ("-rw-r--r--", "644")
        } else {
            ("drwxr-xr-x", "755")
        };
        Self {
            key: Self::key_for(&name, is_file),
            mimetype: if is_file {
                "application/octet-stream".to_string()
            } else {
                "inode/directory".to_string()
            },
            name,
            mode: mode.to_string(),
            mode_bits: mode_bits.to_string(),
            size: 0,
            is_file,
            is_symlink: false,
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>, mode_bits: impl Into<String>) -> Self {
        self.mode = mode.into();
        self.mode_bits = mode_bits.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Build the identity key for a row
    pub fn key_for(name: &str, is_file: bool) -> String {
        format!("{}_{}", if is_file { "file" } else { "dir" }, name)
    }

    pub fn is_directory(&self) -> bool {
        !self.is_file
    }

    /// Whether this entry is an archive the panel can extract
    ///
    /// Computed on every call so a renamed entry is never misclassified.
    pub fn is_archive_type(&self) -> bool {
        if !self.is_file {
            return false;
        }
        let mimetype = self.mimetype.as_str();
        if ARCHIVE_MIMETYPES.contains(&mimetype) {
            return true;
        }
        if !GENERIC_MIMETYPES.contains(&mimetype) {
            return false;
        }
        let lower = self.name.to_lowercase();
        ARCHIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }

    /// The single archive-related action offered for this entry
    pub fn archive_action(&self) -> ActionKind {
        if self.is_archive_type() {
            ActionKind::Unarchive
        } else {
            ActionKind::Archive
        }
    }
}

/// Ordered listing of one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// The directory that was listed
    pub directory: String,
    /// Entries in display order
    pub entries: Vec<FileEntity>,
}

impl DirectoryListing {
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn find_by_key(&self, key: &str) -> Option<&FileEntity> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Server and directory an action runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryContext {
    pub server_id: String,
    pub directory: String,
}

impl DirectoryContext {
    pub fn new(server_id: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            directory: directory.into(),
        }
    }

    /// Fully-qualified path of `name` inside this directory
    ///
    /// `.` segments are dropped and `..` removes the segment before it; `..`
    /// at the root stays at the root.
    pub fn join(&self, name: &str) -> String {
        let mut segments: Vec<&str> = Vec::new();
        for segment in self.directory.split('/').chain(name.split('/')) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        format!("/{}", segments.join("/"))
    }
}

/// Every action a listing row can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Rename,
    Move,
    Chmod,
    Copy,
    Download,
    Archive,
    Unarchive,
    Delete,
    PluginToggle,
}

impl ActionKind {
    /// Permission the current user needs before the action is offered
    ///
    /// `None` means the action is offered to anyone who can see the row.
    pub fn required_permission(self) -> Option<&'static str> {
        match self {
            ActionKind::Rename
            | ActionKind::Move
            | ActionKind::Chmod
            | ActionKind::PluginToggle => Some("file.update"),
            ActionKind::Copy | ActionKind::Unarchive => Some("file.create"),
            ActionKind::Archive => Some("file.archive"),
            ActionKind::Delete => Some("file.delete"),
            ActionKind::Download => None,
        }
    }

    /// How the listing is brought back in line with the server
    pub fn reconciliation(self) -> Reconciliation {
        match self {
            ActionKind::Delete => Reconciliation::Optimistic,
            ActionKind::Download => Reconciliation::None,
            ActionKind::PluginToggle => Reconciliation::RefreshAlways,
            _ => Reconciliation::RefreshAfter,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::Rename => "Rename",
            ActionKind::Move => "Move",
            ActionKind::Chmod => "Permissions",
            ActionKind::Copy => "Copy",
            ActionKind::Download => "Download",
            ActionKind::Archive => "Archive",
            ActionKind::Unarchive => "Unarchive",
            ActionKind::Delete => "Delete",
            ActionKind::PluginToggle => "Plugin toggle",
        };
        f.write_str(label)
    }
}

/// Listing reconciliation strategy of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Mutate the listing before the remote call, refresh only on failure
    Optimistic,
    /// Leave the listing alone, refresh once the remote call succeeds
    RefreshAfter,
    /// Leave the listing alone, refresh once the remote call settles either way
    RefreshAlways,
    /// The action never touches the listing
    None,
}

impl Reconciliation {
    pub fn mutates_first(self) -> bool {
        self == Reconciliation::Optimistic
    }

    pub fn refresh_on_success(self) -> bool {
        matches!(self, Reconciliation::RefreshAfter | Reconciliation::RefreshAlways)
    }

    pub fn refresh_on_failure(self) -> bool {
        matches!(self, Reconciliation::Optimistic | Reconciliation::RefreshAlways)
    }
}

/// A single rename instruction, relative to the request root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePair {
    pub from: String,
    pub to: String,
}

impl RenamePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Description of one in-flight remote request
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub names: Vec<String>,
    pub server_id: String,
    pub directory: String,
}

impl PendingAction {
    pub fn new(kind: ActionKind, ctx: &DirectoryContext, names: Vec<String>) -> Self {
        Self {
            kind,
            names,
            server_id: ctx.server_id.clone(),
            directory: ctx.directory.clone(),
        }
    }
}

/// What the caller should do once an action has settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The remote side accepted the action
    Completed,
    /// The client should navigate to this URL
    Redirect { url: String },
    /// The action failed; the error is already on the error channel
    Failed { kind: crate::error::ErrorKind },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ActionOutcome::Failed { .. })
    }
}
