use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use leptos::prelude::*;

/// Top navigation bar. Capabilities come in as props rather than being read
/// from ambient session state, so the caller decides what this header may
/// show.
#[component]
pub fn SiteHeader(
    #[prop(into)] is_admin: Signal<bool>,
    #[prop(into)] on_logout: Callback<()>,
) -> impl IntoView {
    view! {
        <header class="sticky top-0 z-10 border-b bg-background/90 backdrop-blur">
            <div class="mx-auto flex w-full max-w-5xl items-center justify-between px-4 py-3">
                <a href="/" class="text-lg font-semibold tracking-tight">
                    "My Blog"
                </a>

                <nav class="flex items-center gap-1 text-sm">
                    <a href="/" class="rounded-md px-3 py-1.5 text-muted-foreground hover:bg-accent hover:text-accent-foreground">
                        "Home"
                    </a>
                    <a href="/posts" class="rounded-md px-3 py-1.5 text-muted-foreground hover:bg-accent hover:text-accent-foreground">
                        "Posts"
                    </a>
                    <a href="/tags" class="rounded-md px-3 py-1.5 text-muted-foreground hover:bg-accent hover:text-accent-foreground">
                        "Tags"
                    </a>

                    <Show
                        when=move || is_admin.get()
                        fallback=|| view! {
                            <a href="/admin/login" class="rounded-md px-3 py-1.5 text-muted-foreground hover:bg-accent hover:text-accent-foreground">
                                "Admin"
                            </a>
                        }
                    >
                        <a href="/admin" class="rounded-md px-3 py-1.5 text-muted-foreground hover:bg-accent hover:text-accent-foreground">
                            "Dashboard"
                        </a>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| on_logout.run(())
                        >
                            "Sign out"
                        </Button>
                    </Show>
                </nav>
            </div>
        </header>
    }
}

#[component]
pub fn SiteFooter() -> impl IntoView {
    view! {
        <footer class="border-t py-6">
            <p class="text-center text-xs text-muted-foreground">
                "Powered by a small blog engine."
            </p>
        </footer>
    }
}
