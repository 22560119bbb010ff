//! Devices Page
//!
//! Device manager: add form, rename in place, delete, and a dashboard link per device.

use leptos::*;
use leptos_router::*;

use crate::components::SignedInShell;
use crate::state::global::{Device, GlobalState};

/// Device manager page
#[component]
pub fn Devices() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    {
        let state = state.clone();
        spawn_local(async move {
            if let Err(e) = state.refresh_devices().await {
                state.show_error(&e);
            }
        });
    }

    let devices = state.devices;
    let signed_in = state.user;

    view! {
        <SignedInShell>
            <div class="space-y-8">
                <div>
                    <h1 class="text-3xl font-bold">"Devices"</h1>
                    <p class="text-gray-400 mt-1">
                        {move || if signed_in.with(Option::is_some) {
                            "Devices are saved to your account."
                        } else {
                            "Devices are saved in this browser only. Log in to keep them with your account."
                        }}
                    </p>
                </div>

                <AddDeviceForm />

                <section class="bg-gray-800 rounded-xl p-6">
                    <h2 class="text-xl font-semibold mb-4">"Your devices"</h2>
                    <Show
                        when=move || devices.with(|d| !d.is_empty())
                        fallback=|| view! { <p class="text-gray-400 text-sm">"No devices yet."</p> }
                    >
                        <ul class="divide-y divide-gray-700">
                            <For
                                each=move || devices.get()
                                key=|d| (d.id.clone(), d.name.clone())
                                children=|device| view! { <DeviceRow device=device /> }
                            />
                        </ul>
                    </Show>
                </section>
            </div>
        </SignedInShell>
    }
}

#[component]
fn AddDeviceForm() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let name = create_rw_signal(String::new());
    let locator = create_rw_signal(String::new());
    let (saving, set_saving) = create_signal(false);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let device_name = name.get_untracked().trim().to_string();
        let script = locator.get_untracked().trim().to_string();
        if device_name.is_empty() || script.is_empty() {
            state.show_error("Name and script URL are required");
            return;
        }

        set_saving.set(true);
        let state = state.clone();
        spawn_local(async move {
            match state.add_device(device_name, script).await {
                Ok(device) => {
                    name.set(String::new());
                    locator.set(String::new());
                    state.show_success(&format!("Added {}", device.name));
                }
                Err(e) => state.show_error(&e),
            }
            set_saving.set(false);
        });
    };

    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"Add a device"</h2>
            <form class="grid md:grid-cols-[1fr_2fr_auto] gap-3" on:submit=on_submit>
                <input
                    type="text"
                    placeholder="Name"
                    prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev))
                    class="bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-cyan-500 focus:outline-none"
                />
                <input
                    type="text"
                    placeholder="Apps Script URL or deployment id"
                    prop:value=move || locator.get()
                    on:input=move |ev| locator.set(event_target_value(&ev))
                    class="bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-cyan-500 focus:outline-none"
                />
                <button
                    type="submit"
                    disabled=move || saving.get()
                    class="px-6 py-3 bg-cyan-600 hover:bg-cyan-700 disabled:bg-gray-700 rounded-lg font-medium transition-colors"
                >
                    {move || if saving.get() { "Adding..." } else { "Add" }}
                </button>
            </form>
        </section>
    }
}

#[component]
fn DeviceRow(device: Device) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let editing = create_rw_signal(false);
    let draft = create_rw_signal(device.name.clone());
    let id = store_value(device.id.clone());

    let state_for_save = state.clone();
    let save = move || {
        let new_name = draft.get_untracked().trim().to_string();
        if new_name.is_empty() {
            state_for_save.show_error("Name cannot be empty");
            return;
        }

        let state = state_for_save.clone();
        spawn_local(async move {
            match state.rename_device(id.get_value(), new_name).await {
                Ok(()) => state.show_success("Device renamed"),
                Err(e) => state.show_error(&e),
            }
        });
        editing.set(false);
    };

    let on_delete = move |_| {
        let state = state.clone();
        spawn_local(async move {
            match state.delete_device(id.get_value()).await {
                Ok(()) => state.show_success("Device deleted"),
                Err(e) => state.show_error(&e),
            }
        });
    };

    let dashboard_href = format!("/dashboard?device={}", device.id);
    let name = device.name.clone();

    view! {
        <li class="py-4 flex flex-wrap items-center justify-between gap-4">
            <div class="min-w-0">
                <Show
                    when=move || editing.get()
                    fallback=move || view! {
                        <span class="font-medium">{name.clone()}</span>
                    }
                >
                    <form
                        class="flex space-x-2"
                        on:submit={
                            let save = save.clone();
                            move |ev: ev::SubmitEvent| {
                                ev.prevent_default();
                                save();
                            }
                        }
                    >
                        <input
                            type="text"
                            prop:value=move || draft.get()
                            on:input=move |ev| draft.set(event_target_value(&ev))
                            class="bg-gray-700 rounded-lg px-3 py-1 border border-gray-600 focus:border-cyan-500 focus:outline-none"
                        />
                        <button type="submit" class="px-3 py-1 bg-cyan-600 hover:bg-cyan-700 rounded-lg text-sm">"Save"</button>
                        <button
                            type="button"
                            class="px-3 py-1 bg-gray-700 hover:bg-gray-600 rounded-lg text-sm"
                            on:click=move |_| editing.set(false)
                        >
                            "Cancel"
                        </button>
                    </form>
                </Show>

                <div class="text-xs text-gray-500 mt-1 truncate">
                    {device.kind.clone()} " · " {device.script_url.clone()}
                </div>
                <div class="flex flex-wrap gap-2 mt-2">
                    {device.metrics.iter().map(|m| view! {
                        <span class="px-2 py-0.5 rounded bg-gray-700 text-xs text-gray-300 capitalize">{m.clone()}</span>
                    }).collect_view()}
                </div>
            </div>

            <div class="flex items-center space-x-2">
                <A href=dashboard_href class="px-3 py-2 bg-gray-700 hover:bg-gray-600 rounded-lg text-sm">
                    "Open dashboard"
                </A>
                <button
                    class="px-3 py-2 bg-gray-700 hover:bg-gray-600 rounded-lg text-sm"
                    on:click=move |_| editing.set(true)
                >
                    "Rename"
                </button>
                <button
                    class="px-3 py-2 bg-red-700 hover:bg-red-600 rounded-lg text-sm"
                    on:click=on_delete
                >
                    "Delete"
                </button>
            </div>
        </li>
    }
}
