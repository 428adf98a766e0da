// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod clock;
pub mod ids;
pub mod model;
pub mod seed;
pub mod state;

pub use clock::*;
pub use ids::*;
pub use model::*;
pub use seed::*;
pub use state::*;
