// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod profile;
pub mod session;

pub use profile::{HttpProfileClient, ProfileClient, ProfileError, UserProfile};
pub use session::{InMemorySessionStore, SessionRecord, SessionStore, SessionStoreError};
