// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::{Session, format_file_size};

pub async fn du_command(session: &Session, path: &str, bytes: bool) -> Result<String> {
    let size = session.fs.get_size(path).await?;
    let shown = if bytes { size.to_string() } else { format_file_size(size) };
    Ok(format!("{shown}\t{path}"))
}
