//! Layered configuration resolution and persistence for the webstash
//! archiver. Declare your keys, point at the config file, and go.
//!
//! Stashfig merges configuration from four sources into a single typed
//! namespace:
//!
//! ```text
//! Compiled defaults     literal, or computed from other keys
//!        ↑ overridden by
//! Config file           INI sections in Webstash.conf
//!        ↑ overridden by
//! Environment vars      e.g. env SAVE_FAVICON=False webstash add '...'
//!        ↑ overridden by
//! Explicit overrides    e.g. CLI flags (highest priority)
//! ```
//!
//! Every layer is sparse: a config file or the environment only names the
//! keys it wants to override, and unset keys fall through to the layer below.
//!
//! # Declared keys and sections
//!
//! The application declares its keys in *sections* — external groupings that
//! implement [`ConfigSection`]. A section names the `[HEADER]` its keys are
//! written under, declares each key's default, type, and deprecated aliases,
//! and accepts in-place updates while a persist is in flight. Sections are
//! registered once at startup into a [`SectionRegistry`]; key ownership is a
//! plain table lookup from then on.
//!
//! A key's declared [`ValueType`] drives strict coercion of raw strings:
//! booleans accept only `true`/`yes`/`1` and `false`/`no`/`0`, integers must
//! be all digits, string keys reject boolean lookalikes, and `list`/`dict`
//! keys take JSON text. A key declared without a type is read-only: it always
//! serves its (possibly computed) default and never reads the environment or
//! the file.
//!
//! # Partial-failure resolution
//!
//! [`resolve()`] never aborts on a bad value. Each coercion
//! failure is collected as a per-key error, the key falls back to its
//! default, and every other key resolves normally — a typo in one setting
//! does not make the whole tool unusable. Callers inspect
//! [`Resolution::errors`] to report what went wrong.
//!
//! # Crash-safe persistence
//!
//! [`ConfigContext::persist`] merges a change set into the parsed INI
//! document (comments and ordering preserved), rewrites the file, and
//! validates the result by re-resolving the full configuration. The pre-write
//! bytes are held in a `.bak` sibling for the duration: validation failure
//! restores them byte-for-byte and surfaces
//! [`PersistFailed`](ConfigError::PersistFailed) with the original error; a
//! crash mid-write leaves the `.bak` behind for recovery. There is no
//! cross-process locking — concurrent writers need an external lock.
//!
//! # Example
//!
//! ```ignore
//! let ctx = ConfigContext::in_data_dir(registry).expect("no home directory");
//! let resolution = ctx.load()?;
//! if resolution.values["SAVE_FAVICON"].as_bool() == Some(true) {
//!     // ...
//! }
//! ctx.persist(&BTreeMap::from([("TIMEOUT".into(), "600".into())]))?;
//! ```

pub mod error;

mod context;
mod ini;
mod persist;
mod registry;
mod resolve;
mod schema;
mod sources;
mod value;

#[cfg(test)]
mod fixtures;

pub use context::{ConfigContext, CONFIG_FILENAME};
pub use error::ConfigError;
pub use ini::{IniDocument, IniSection};
pub use persist::{persist, CONFIG_HEADER};
pub use registry::{ConfigSection, SectionRegistry};
pub use resolve::{resolve, Resolution, ResolveInput};
pub use schema::{dependency_order, DefaultValue, KeySpec, ResolvedConfig};
pub use sources::{environment_snapshot, read_config_file, RawSourceMap};
pub use value::{coerce, ConfigValue, ValueType, BOOL_FALSEIES, BOOL_TRUEIES};
