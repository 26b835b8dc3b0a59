//! Apartment placement engine for PlanMix.
//!
//! This crate partitions a rectangular building grid into connected
//! apartment regions by backtracking search. Everything here is pure logic:
//! functions take plain data and return results, so the engine runs the
//! same way under the headless harness, in tests, or behind any renderer.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`apartment`] | Apartment specs, half-cell detection, default facade minimums |
//! | [`config`] | Search configuration and up-front validation |
//! | [`constraints`] | Circulation contact, facade and enfilade acceptance rules |
//! | [`grid`] | Labeled coarse and fine cell grids |
//! | [`half_cell`] | Fine-grid attachment of 0.5-cell remainders |
//! | [`ranking`] | Scoring, signature deduplication, variance post-filter |
//! | [`region`] | Prioritized flood-fill enumeration of candidate regions |
//! | [`shape`] | Compactness and shape descriptors |
//! | [`similarity`] | Cross-apartment shape similarity filter |
//! | [`site`] | Building extents, circulation and facade queries |
//! | [`solution`] | Solution records and text summary |
//! | [`solver`] | Backtracking search and statistics |
//! | [`validation`] | Structural audit of finished solutions |
//!
//! ```
//! use planmix_logic::apartment::ApartmentSpec;
//! use planmix_logic::config::PlanConfig;
//! use planmix_logic::solver::PlanSolver;
//!
//! let config = PlanConfig {
//!     n_cells_x: 5,
//!     n_cells_y: 2,
//!     circulation: vec![(2, 0), (2, 1)],
//!     apartments: vec![ApartmentSpec::new("2p", 4.0), ApartmentSpec::new("2p", 4.0)],
//!     ..PlanConfig::default()
//! };
//! let outcome = PlanSolver::new(config).unwrap().solve();
//! assert_eq!(outcome.solutions.len(), 1);
//! ```

pub mod apartment;
pub mod config;
pub mod constraints;
pub mod grid;
pub mod half_cell;
pub mod ranking;
pub mod region;
pub mod shape;
pub mod similarity;
pub mod site;
pub mod solution;
pub mod solver;
pub mod validation;
