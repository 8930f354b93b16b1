// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Read-only listers over local caches of Kubernetes resources
//!
//! A [`Lister`](kubernetes::Lister) answers list-by-label-selector and
//! get-by-name queries against any store implementing
//! [`Indexer`](kubernetes::Indexer): the bundled [`MemoryStore`](kubernetes::MemoryStore),
//! a kube-runtime reflector `Store`, or a test double.
//!
//! ```ignore
//! use std::sync::Arc;
//! use kube_lister::kubernetes::{MemoryStore, Selector, new_cluster_issuer_lister};
//!
//! let store = Arc::new(MemoryStore::new());
//! let lister = new_cluster_issuer_lister(Arc::clone(&store));
//! let prod = lister.list(&Selector::parse("env=prod")?)?;
//! ```

pub mod apis;
pub mod kubernetes;
