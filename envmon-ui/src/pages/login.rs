//! Login Page

use leptos::*;
use leptos_router::*;

use crate::api::{self, LoginOutcome};
use crate::pages::signup::{AuthCard, TextField};
use crate::state::global::GlobalState;

const LOGIN_FAILED: &str = "Invalid email or password";

/// Credential form; a successful login stores the profile and opens the dashboard
#[component]
pub fn Login() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let (submitting, set_submitting) = create_signal(false);
    let (failure, set_failure) = create_signal(None::<String>);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        set_failure.set(None);
        set_submitting.set(true);

        let email = email.get_untracked().trim().to_string();
        let password = password.get_untracked();
        let state = state.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api::login(&email, &password).await {
                Ok(LoginOutcome::Success { status, user }) if status == "Success" => {
                    state.sign_in(user);
                    if let Err(e) = state.refresh_devices().await {
                        state.show_error(&e);
                    }
                    navigate("/dashboard", Default::default());
                }
                Ok(_) => set_failure.set(Some(LOGIN_FAILED.to_string())),
                Err(e) => {
                    web_sys::console::error_1(&format!("Login failed: {}", e).into());
                    set_failure.set(Some(LOGIN_FAILED.to_string()));
                }
            }
            set_submitting.set(false);
        });
    };

    view! {
        <AuthCard title="Log in">
            <form class="space-y-4" on:submit=on_submit>
                <TextField label="Email" kind="email" value=email />
                <TextField label="Password" kind="password" value=password />

                {move || failure.get().map(|msg| view! {
                    <p class="text-sm text-red-400">{msg}</p>
                })}

                <button
                    type="submit"
                    disabled=move || submitting.get()
                    class="w-full py-3 bg-cyan-600 hover:bg-cyan-700 disabled:bg-gray-700 rounded-lg font-medium transition-colors"
                >
                    {move || if submitting.get() { "Signing in..." } else { "Log in" }}
                </button>
            </form>

            <p class="text-sm text-gray-400 mt-6 text-center">
                "No account yet? "
                <A href="/signup" class="text-cyan-400 hover:underline">"Sign up"</A>
            </p>
        </AuthCard>
    }
}
