//! Random tables for Table Roller.
//!
//! A table maps integer keys to result text. Result text may embed links
//! in square brackets:
//!
//! - `[2d6]`, `[3]`: a bare roll, replaced by its value
//! - `[1d4@Goblins]`, `[2@Loot]`: roll that many times on another table
//!
//! Tables live in a [`TableStore`]; a [`Resolver`] expands a result's links
//! recursively, up to a configurable depth.
//!
//! ```
//! use tr_dice::FixedRolls;
//! use tr_tables::{Resolver, Table, TableStore};
//!
//! let loot = Table::new("Loot", "length", [(1, "A sword"), (2, "A shield")]).unwrap();
//! let room = Table::new("Room", "length", [(1, "You find [1@Loot]")]).unwrap();
//! let store: TableStore = [loot, room].into_iter().collect();
//!
//! let resolution = Resolver::new(&store)
//!     .resolve(store.get("Room").unwrap(), 1, &mut FixedRolls::new(vec![1]))
//!     .unwrap();
//! assert_eq!(resolution.to_string(), "You find [1 on Loot]\n\tA sword");
//! ```

pub mod config;
pub mod error;
pub mod link;
pub mod loader;
pub mod resolver;
pub mod store;
pub mod table;
pub mod validate;

pub use config::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT, MAX_REFERENCE_ROLLS, ResolverConfig};
pub use error::{TableError, TableResult};
pub use link::{LinkKind, LinkToken, RawLink, classify, extract, scan};
pub use loader::{LoadReport, load_dir, load_file, parse_defs};
pub use resolver::{Resolution, ResolvedText, RolledEntry, Resolver, resolve};
pub use store::TableStore;
pub use table::{EmbeddedLink, LENGTH_ROLL, ResultText, Table, TableDef, TableRoll};
pub use validate::{Diagnostic, Severity, check_store, has_errors, render_diagnostics};
