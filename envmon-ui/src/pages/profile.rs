//! Profile Page
//!
//! Shows the stored profile and refreshes it from the API.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::{Loading, SignedInShell};
use crate::state::global::GlobalState;

#[component]
pub fn Profile() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let user = state.user;
    let (refreshing, set_refreshing) = create_signal(false);

    if let Some(id) = state.user_id() {
        set_refreshing.set(true);
        let state = state.clone();
        spawn_local(async move {
            match api::fetch_user(&id).await {
                Ok(fresh) => state.sign_in(fresh),
                Err(e) => {
                    web_sys::console::warn_1(&format!("Profile refresh failed: {}", e).into());
                }
            }
            set_refreshing.set(false);
        });
    }

    view! {
        <SignedInShell>
            <div class="space-y-8 max-w-2xl">
                <div>
                    <h1 class="text-3xl font-bold">"Account"</h1>
                    <p class="text-gray-400 mt-1">"Your profile details"</p>
                </div>

                {move || match user.get() {
                    Some(profile) => view! {
                        <section class="bg-gray-800 rounded-xl p-6 space-y-4">
                            <ProfileRow label="Name" value=profile.name />
                            <ProfileRow label="Email" value=profile.email />
                            <ProfileRow label="Phone" value=profile.phone />
                            {profile.created_at.map(|at| view! {
                                <ProfileRow label="Member since" value=at />
                            })}
                        </section>
                    }.into_view(),
                    None if refreshing.get() => view! { <Loading /> }.into_view(),
                    None => view! {
                        <section class="bg-gray-800 rounded-xl p-6 text-center">
                            <p class="text-gray-400 mb-4">"You are not signed in."</p>
                            <A href="/login" class="px-4 py-2 bg-cyan-600 hover:bg-cyan-700 rounded-lg">"Log in"</A>
                        </section>
                    }.into_view(),
                }}
            </div>
        </SignedInShell>
    }
}

#[component]
fn ProfileRow(label: &'static str, #[prop(into)] value: String) -> impl IntoView {
    view! {
        <div class="flex justify-between border-b border-gray-700 pb-3 last:border-0">
            <span class="text-gray-400">{label}</span>
            <span class="font-medium">{value}</span>
        </div>
    }
}
