//! Welcome Page

use leptos::*;
use leptos_router::*;

use crate::state::global::GlobalState;

/// Landing page with entry points to sign up, log in or go straight to the dashboard
#[component]
pub fn Welcome() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let signed_in = move || state.user.with(Option::is_some);

    view! {
        <div class="flex flex-col items-center justify-center min-h-screen text-center px-4">
            <div class="text-6xl mb-4">"🌿"</div>
            <h1 class="text-4xl font-bold mb-2">"Envmon"</h1>
            <p class="text-gray-400 mb-8 max-w-md">
                "Watch temperature, humidity and air quality from your sensors in one place."
            </p>

            <Show
                when=signed_in
                fallback=|| view! {
                    <div class="flex space-x-4">
                        <A href="/signup" class="px-6 py-3 bg-cyan-600 hover:bg-cyan-700 rounded-lg font-medium transition-colors">
                            "Create account"
                        </A>
                        <A href="/login" class="px-6 py-3 bg-gray-700 hover:bg-gray-600 rounded-lg font-medium transition-colors">
                            "Log in"
                        </A>
                    </div>
                    <A href="/dashboard" class="mt-6 text-sm text-gray-400 hover:text-white underline">
                        "Continue without an account"
                    </A>
                }
            >
                <A href="/dashboard" class="px-6 py-3 bg-cyan-600 hover:bg-cyan-700 rounded-lg font-medium transition-colors">
                    "Open dashboard"
                </A>
            </Show>
        </div>
    }
}
