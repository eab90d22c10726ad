// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The field list at the top of every request notification.

use accessbot_core::types::AccessRequestData;

use crate::{REQUEST_REASON_LIMIT, fenced};

/// Deep link to a request in the web UI.
pub fn request_link(web_proxy_url: &str, request_id: &str) -> String {
    format!(
        "{}/web/requests/{request_id}",
        web_proxy_url.trim_end_matches('/')
    )
}

/// Ordered request fields, ending with a link or review command hints.
///
/// Empty user, roles and reason are omitted. Hints are shown only while the
/// request is unresolved and no web proxy URL is known.
pub fn fields_text(
    request_id: &str,
    data: &AccessRequestData,
    cluster_name: &str,
    web_proxy_url: Option<&str>,
) -> String {
    fields_text_with_limit(
        request_id,
        data,
        cluster_name,
        web_proxy_url,
        REQUEST_REASON_LIMIT,
    )
}

pub fn fields_text_with_limit(
    request_id: &str,
    data: &AccessRequestData,
    cluster_name: &str,
    web_proxy_url: Option<&str>,
    reason_limit: usize,
) -> String {
    let mut lines = vec![
        format!("*ID*: {request_id}"),
        format!("*Cluster*: {cluster_name}"),
    ];

    if !data.user.is_empty() {
        lines.push(format!("*User*: {}", data.user));
    }
    if !data.roles.is_empty() {
        lines.push(format!("*Role(s)*: `{}`", data.roles.join(",")));
    }
    if !data.request_reason.is_empty() {
        lines.push(format!(
            "*Reason*: {}",
            fenced(&data.request_reason, reason_limit)
        ));
    }

    match web_proxy_url {
        Some(url) if !url.is_empty() => {
            lines.push(format!("*Link*: {}", request_link(url, request_id)));
        }
        _ if !data.resolution_tag.is_resolved() => {
            lines.push(format!(
                "*Approve*: `tsh request review --approve {request_id}`"
            ));
            lines.push(format!("*Deny*: `tsh request review --deny {request_id}`"));
        }
        _ => {}
    }

    lines.join("\n")
}
