//! Chat message component

use casemind_core::types::ClaimChatMessage;
use chrono::{DateTime, Local};
use leptos::prelude::*;

fn timestamp(created_at: Option<&str>) -> String {
    created_at
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_default()
}

/// Render a single transcript entry
#[component]
pub fn ChatMessage(message: ClaimChatMessage) -> impl IntoView {
    let is_assistant = message.is_assistant();
    let meta = format!("{} • {}", message.sender, timestamp(message.created_at.as_deref()));

    view! {
        <div class=format!(
            "flex message-appear {}",
            if is_assistant { "" } else { "flex-row-reverse" }
        )>
            <div class=format!(
                "max-w-[85%] px-3 py-2 rounded-2xl text-sm {}",
                if is_assistant {
                    "bg-slate-800 text-slate-100 rounded-tl-sm"
                } else {
                    "bg-blue-600 text-white rounded-tr-sm"
                }
            )>
                <div class="text-xs opacity-70">{meta}</div>
                <p class="whitespace-pre-wrap break-words">{message.content}</p>
            </div>
        </div>
    }
}
