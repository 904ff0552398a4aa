// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod cat;
pub mod du;
pub mod ls;
pub mod stat;
pub mod tree;

pub use cat::cat_command;
pub use du::du_command;
pub use ls::ls_command;
pub use stat::stat_command;
pub use tree::tree_command;

#[cfg(test)]
pub(crate) async fn test_session() -> crate::common::Session {
    crate::common::Session::open(None, None, None).await.unwrap()
}
