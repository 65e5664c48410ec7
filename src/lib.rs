// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # goalpost
//!
//! A personal goal tracker: where each goal stands, which goals need
//! attention today, which schedule week is in effect, and which vocabulary
//! to practise next.
//!
//! ## Architecture
//!
//! - **Core** (`content`, `progression`, `schedule`, `urgency`, `agenda`,
//!   `vocab`): pure functions over explicit inputs and one [`clock::Today`]
//! - **Collaborators** (`store`): traits for goals, logs, schedule state and
//!   task lists, with a YAML implementation over the repo's `_data/` files
//! - **Facade** (`tracker`): the operations the CLI drives
//! - **Ambient** (`error`, `paths`, `settings`, `report`)
//!
//! ## Library usage
//!
//! ```no_run
//! use goalpost::clock::Today;
//! use goalpost::store::YamlRepo;
//! use goalpost::tracker::Tracker;
//!
//! let tracker = Tracker::open(YamlRepo::open("/home/me/goals")).unwrap();
//! let today = Today::now();
//! for todo in tracker.compute_todos(&today) {
//!     println!("[{}] {}", todo.priority, todo.message);
//! }
//! ```

pub mod agenda;
pub mod clock;
pub mod content;
pub mod error;
pub mod goal;
pub mod log;
pub mod paths;
pub mod progression;
pub mod report;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod todo;
pub mod tracker;
pub mod urgency;
pub mod vocab;
