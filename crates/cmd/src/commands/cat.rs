// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Session;
use diagnostics::debug;

pub async fn cat_command(session: &Session, path: &str) -> Result<Vec<u8>> {
    debug!("reading {path} as {user}", path: path, user: session.user.to_string());
    Ok(session.fs.read_file(path, &session.user).await?)
}
