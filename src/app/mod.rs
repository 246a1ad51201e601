use crate::pages::{
    AdminAuthed, AdminDashboardPage, AdminLoginPage, HomePage, PostDetailPage, PostListPage,
    RegisterPage, TagManagerPage, TagsPage,
};
use crate::state::{AppContext, AppState};
use crate::storage::save_user_to_storage;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext(AppState::new());
    provide_context(ctx);

    // Revalidate a stored session on startup; a dead token is cleared before
    // any admin page trusts it.
    Effect::new(move |_| {
        let api_client = ctx.0.api_client.get_untracked();
        if !api_client.is_authenticated() {
            return;
        }
        spawn_local(async move {
            match api_client.get_profile().await {
                Ok(user) => {
                    save_user_to_storage(&user);
                    ctx.0.current_user.set(Some(user));
                }
                Err(e) => {
                    if e.ends_session() {
                        ctx.logout();
                    }
                }
            }
        });
    });

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=HomePage />
                <Route path=path!("posts") view=PostListPage />
                <Route path=path!("posts/:id") view=PostDetailPage />
                <Route path=path!("tags") view=TagsPage />
                <Route path=path!("register") view=RegisterPage />
                <Route path=path!("admin/login") view=AdminLoginPage />
                <Route path=path!("admin") view=move || view! {
                    <AdminAuthed>
                        <AdminDashboardPage />
                    </AdminAuthed>
                } />
                <Route path=path!("admin/posts/new") view=move || view! {
                    <AdminAuthed>
                        <crate::editor::PostEditorPage />
                    </AdminAuthed>
                } />
                <Route path=path!("admin/posts/:id/edit") view=move || view! {
                    <AdminAuthed>
                        <crate::editor::PostEditorPage />
                    </AdminAuthed>
                } />
                <Route path=path!("admin/tags") view=move || view! {
                    <AdminAuthed>
                        <TagManagerPage />
                    </AdminAuthed>
                } />
            </Routes>
        </Router>
    }
}
