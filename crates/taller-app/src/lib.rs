// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod catalog;
pub mod fetch;
pub mod forms;
pub mod ids;
pub mod listing;
pub mod metrics;
pub mod model;
pub mod present;
pub mod query;
pub mod state;
pub mod validation;
pub mod view;

pub use fetch::*;
pub use forms::*;
pub use ids::*;
pub use listing::*;
pub use metrics::*;
pub use model::*;
pub use present::*;
pub use query::*;
pub use state::*;
pub use validation::*;
pub use view::*;
