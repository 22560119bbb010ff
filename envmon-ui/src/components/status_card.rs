//! Status Card Component
//!
//! A single reading with its unit and an optional band label.

use leptos::*;

/// Text colour for a band or air-quality label
pub fn label_class(label: &str) -> &'static str {
    match label {
        "Good" => "text-green-400",
        "Moderate" => "text-yellow-400",
        "Unhealthy" | "Poor" => "text-red-400",
        _ => "text-gray-400",
    }
}

/// Reading card
#[component]
pub fn StatusCard(
    /// Card title
    #[prop(into)]
    title: String,
    icon: &'static str,
    /// Formatted value; `None` renders a dash
    #[prop(into)]
    value: Signal<Option<String>>,
    #[prop(optional, into)]
    unit: Option<String>,
    /// Band label shown under the value
    #[prop(optional, into)]
    status: Option<Signal<Option<String>>>,
) -> impl IntoView {
    view! {
        <div class="bg-gray-800 rounded-lg p-4 border border-gray-700 hover:border-gray-600 transition">
            <div class="flex items-center justify-between">
                <span class="text-gray-400 text-sm">{title}</span>
                <span class="text-xl">{icon}</span>
            </div>

            <div class="text-3xl font-bold mt-2">
                {move || value.get().unwrap_or_else(|| "—".to_string())}
                {unit.clone().map(|u| view! {
                    <span class="text-base text-gray-500 ml-1">{u}</span>
                })}
            </div>

            {status.map(|status| view! {
                <div class="mt-2 text-sm">
                    {move || match status.get() {
                        Some(label) => view! {
                            <span class=label_class(&label)>{label.clone()}</span>
                        }.into_view(),
                        None => view! {
                            <span class="text-gray-500">"No data"</span>
                        }.into_view(),
                    }}
                </div>
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_class() {
        assert_eq!(label_class("Good"), "text-green-400");
        assert_eq!(label_class("Moderate"), "text-yellow-400");
        assert_eq!(label_class("Unhealthy"), "text-red-400");
        assert_eq!(label_class("Poor"), "text-red-400");
        assert_eq!(label_class("?"), "text-gray-400");
    }
}
