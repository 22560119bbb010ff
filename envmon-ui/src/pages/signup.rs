//! Signup Page

use leptos::*;
use leptos_router::*;

use crate::api::{self, SignupOutcome, SignupRequest};
use crate::state::global::GlobalState;

/// Account registration form
#[component]
pub fn Signup() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let name = create_rw_signal(String::new());
    let email = create_rw_signal(String::new());
    let phone = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let req = SignupRequest {
            name: name.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
            phone: phone.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        if req.email.is_empty() || req.password.is_empty() {
            state.show_error("Email and password are required");
            return;
        }

        set_submitting.set(true);
        let state = state.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api::signup(&req).await {
                Ok(SignupOutcome::Created(_)) => {
                    state.show_success("Account created. Please log in.");
                    navigate("/login", Default::default());
                }
                Ok(SignupOutcome::Failed { message }) => state.show_error(&message),
                Err(e) => state.show_error(&e),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <AuthCard title="Create your account">
            <form class="space-y-4" on:submit=on_submit>
                <TextField label="Name" kind="text" value=name />
                <TextField label="Email" kind="email" value=email />
                <TextField label="Phone" kind="tel" value=phone />
                <TextField label="Password" kind="password" value=password />

                <button
                    type="submit"
                    disabled=move || submitting.get()
                    class="w-full py-3 bg-cyan-600 hover:bg-cyan-700 disabled:bg-gray-700 rounded-lg font-medium transition-colors"
                >
                    {move || if submitting.get() { "Creating..." } else { "Sign up" }}
                </button>
            </form>

            <p class="text-sm text-gray-400 mt-6 text-center">
                "Already registered? "
                <A href="/login" class="text-cyan-400 hover:underline">"Log in"</A>
            </p>
        </AuthCard>
    }
}

/// Centered card used by the signup and login screens
#[component]
pub fn AuthCard(title: &'static str, children: Children) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen px-4">
            <div class="w-full max-w-md bg-gray-800 rounded-xl p-8 border border-gray-700">
                <A href="/" class="block text-center text-3xl mb-2">"🌿"</A>
                <h1 class="text-2xl font-bold text-center mb-6">{title}</h1>
                {children()}
            </div>
        </div>
    }
}

/// Labelled input bound to a signal
#[component]
pub fn TextField(
    label: &'static str,
    kind: &'static str,
    value: RwSignal<String>,
) -> impl IntoView {
    view! {
        <label class="block">
            <span class="block text-sm text-gray-400 mb-2">{label}</span>
            <input
                type=kind
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
                class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-cyan-500 focus:outline-none"
            />
        </label>
    }
}
