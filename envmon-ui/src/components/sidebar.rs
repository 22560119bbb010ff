//! Sidebar Navigation
//!
//! Collapsible side navigation shown on every signed-in screen.

use leptos::*;
use leptos_router::*;

use crate::state::global::GlobalState;

/// Side navigation with a collapse toggle and sign out
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let collapsed = create_rw_signal(false);
    let navigate = use_navigate();

    let user = state.user;
    let user_name = move || {
        user
            .with(|u| u.as_ref().map(|u| u.name.clone()))
            .unwrap_or_else(|| "Guest".to_string())
    };

    let on_sign_out = move |_| {
        state.sign_out();
        navigate("/", Default::default());
    };

    view! {
        <aside class=move || {
            let width = if collapsed.get() { "w-16" } else { "w-60" };
            format!(
                "{} shrink-0 min-h-screen bg-gray-800 border-r border-gray-700 flex flex-col transition-all",
                width
            )
        }>
            <div class="flex items-center justify-between h-16 px-4 border-b border-gray-700">
                <Show when=move || !collapsed.get()>
                    <A href="/dashboard" class="flex items-center space-x-2">
                        <span class="text-2xl">"🌿"</span>
                        <span class="text-lg font-bold">"Envmon"</span>
                    </A>
                </Show>
                <button
                    class="p-2 rounded-lg text-gray-400 hover:text-white hover:bg-gray-700"
                    title="Toggle sidebar"
                    on:click=move |_| collapsed.update(|c| *c = !*c)
                >
                    {move || if collapsed.get() { "»" } else { "«" }}
                </button>
            </div>

            <nav class="flex-1 p-2 space-y-1">
                <SidebarLink href="/dashboard" icon="📈" label="Dashboard" collapsed=collapsed />
                <SidebarLink href="/devices" icon="📟" label="Devices" collapsed=collapsed />
                <SidebarLink href="/profile" icon="👤" label="Account" collapsed=collapsed />
            </nav>

            <div class="p-2 border-t border-gray-700">
                <Show when=move || !collapsed.get()>
                    <div class="px-3 py-2 text-sm text-gray-400 truncate">{user_name}</div>
                </Show>
                <button
                    class="w-full flex items-center space-x-3 px-3 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700"
                    on:click=on_sign_out
                >
                    <span>"⎋"</span>
                    <Show when=move || !collapsed.get()>
                        <span>"Sign out"</span>
                    </Show>
                </button>
            </div>
        </aside>
    }
}

#[component]
fn SidebarLink(
    href: &'static str,
    icon: &'static str,
    label: &'static str,
    collapsed: RwSignal<bool>,
) -> impl IntoView {
    view! {
        <A
            href=href
            class="flex items-center space-x-3 px-3 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
            active_class="bg-gray-700 text-white"
        >
            <span title=label>{icon}</span>
            <Show when=move || !collapsed.get()>
                <span>{label}</span>
            </Show>
        </A>
    }
}

/// Sidebar plus a scrolling content area
#[component]
pub fn SignedInShell(children: Children) -> impl IntoView {
    view! {
        <div class="flex min-h-screen">
            <Sidebar />
            <main class="flex-1 p-6 overflow-y-auto">
                {children()}
            </main>
        </div>
    }
}
