//! Structured logging field name constants for vocabase.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request. Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event. Values: "api", "db", "auth".
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem. Examples: "pool", "vocabs", "import".
pub const COMPONENT: &str = "component";

/// Logical operation name. Examples: "list", "import", "add_review".
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owner of the resource being operated on.
pub const USER_ID: &str = "user_id";

/// Vocabulary entry UUID.
pub const VOCAB_ID: &str = "vocab_id";

/// Document UUID.
pub const DOCUMENT_ID: &str = "document_id";

/// Highlight UUID.
pub const HIGHLIGHT_ID: &str = "highlight_id";

/// Content digest of an uploaded file.
pub const FILE_HASH: &str = "file_hash";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a listing or query.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of an uploaded file.
pub const UPLOAD_BYTES: &str = "upload_bytes";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
