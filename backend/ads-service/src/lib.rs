/// Ads Service Library
///
/// Selects the advertisement a customer is most likely to click on, out of the
/// content they are eligible to see in a marketplace. Eligibility is decided
/// by targeting groups: scored bundles of predicates evaluated against the
/// requesting customer.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers for ad generation and content CRUD
/// - `models`: Advertisement content, targeting groups, request context
/// - `services`: Business logic layer (selection, content, targeting groups)
/// - `targeting`: Predicate model and the concurrent targeting evaluator
/// - `clients`: HTTP clients for the customer and prime-club services
/// - `db`: Database access layer and store traits
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod targeting;

pub use config::Config;
pub use error::{AppError, Result};
