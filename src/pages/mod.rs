use crate::api::ApiErrorKind;
use crate::components::chrome::{SiteFooter, SiteHeader};
use crate::components::post_card::PostCard;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription,
    CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::list::{total_pages, ListState, PAGE_SIZE};
use crate::models::{Post, Tag, User};
use crate::state::AppContext;
use crate::storage::save_user_to_storage;
use crate::util::format_date;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params, use_query_map};
use leptos_router::params::Params;

/// Header wired to the shared session: logout clears the token and returns to
/// the public site.
#[component]
fn PageHeader() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let is_admin = Signal::derive(move || app_state.is_authenticated() && app_state.is_admin());
    let on_logout = Callback::new(move |_: ()| {
        app_state.logout();
        let _ = window().location().set_href("/");
    });

    view! { <SiteHeader is_admin=is_admin on_logout=on_logout /> }
}

// ---------------------------------------------------------------------------
// Public pages
// ---------------------------------------------------------------------------

#[component]
pub fn HomePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let posts: RwSignal<Vec<Post>> = RwSignal::new(vec![]);
    let total: RwSignal<i64> = RwSignal::new(0);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    Effect::new(move |_| {
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            let query = ListState::default().to_post_list_query();
            match api_client.get_posts(&query).await {
                Ok(res) => {
                    posts.set(res.posts.into_iter().take(6).collect());
                    total.set(res.total);
                }
                Err(e) => app_state.report_error(error, e),
            }
            loading.set(false);
        });
    });

    let navigate = StoredValue::new(use_navigate());
    let on_tag_click = Callback::new(move |tag: String| {
        let target = format!("/posts{}", ListState::default().with_tag(&tag).to_query_string());
        navigate.with_value(|nav| nav(&target, Default::default()));
    });

    view! {
        <div class="min-h-screen bg-background">
            <PageHeader />

            <main class="mx-auto w-full max-w-5xl px-4 py-10">
                <section class="mb-10 rounded-2xl bg-gradient-to-r from-primary/10 to-accent/30 px-8 py-12 text-center">
                    <h1 class="text-3xl font-bold tracking-tight">"Welcome to My Blog"</h1>
                    <p class="mt-2 text-muted-foreground">
                        "Notes on programming and whatever else comes up."
                    </p>
                    <p class="mt-4 text-sm text-muted-foreground">
                        {move || format!("{} published posts", total.get())}
                    </p>
                </section>

                <div class="mb-4 flex items-center justify-between">
                    <h2 class="text-xl font-semibold">"Latest posts"</h2>
                    <a href="/posts" class="text-sm text-primary hover:underline">
                        "All posts →"
                    </a>
                </div>

                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        error.get().map(|e| view! {
                            <Alert class="mb-4 border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        })
                    }}
                </Show>

                <Show when=move || !loading.get() fallback=move || view! {
                    <div class="flex items-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading posts…"
                    </div>
                }>
                    <Show
                        when=move || !posts.get().is_empty()
                        fallback=|| view! {
                            <p class="text-sm text-muted-foreground">"Nothing published yet."</p>
                        }
                    >
                        <div class="grid grid-cols-1 gap-5 sm:grid-cols-2 lg:grid-cols-3">
                            {move || {
                                posts
                                    .get()
                                    .into_iter()
                                    .map(|post| view! { <PostCard post=post on_tag_click=on_tag_click /> })
                                    .collect_view()
                            }}
                        </div>
                    </Show>
                </Show>
            </main>

            <SiteFooter />
        </div>
    }
}

#[component]
pub fn PostListPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let query_map = use_query_map();
    let navigate = StoredValue::new(use_navigate());

    let state: RwSignal<ListState> = RwSignal::new(ListState::default());
    let posts: RwSignal<Vec<Post>> = RwSignal::new(vec![]);
    let total: RwSignal<i64> = RwSignal::new(0);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let search_input: RwSignal<String> = RwSignal::new(String::new());

    // The address bar owns search/tag/sort. Page number is volatile and is
    // not part of the URL, so back/forward lands on page 1 of the filter.
    Effect::new(move |_| {
        let q = query_map.get();
        let next = ListState::from_query(q.get("search"), q.get("tag"), q.get("sort_by"));
        let current = state.get_untracked();
        if current.search != next.search
            || current.tag != next.tag
            || current.sort_by != next.sort_by
        {
            search_input.set(next.search.clone());
            state.set(next);
        }
    });

    // Responses may land out of order; only the latest issued request applies.
    let fetch_id: RwSignal<u64> = RwSignal::new(0);
    Effect::new(move |_| {
        let st = state.get();
        let rid = fetch_id.get_untracked().saturating_add(1);
        fetch_id.set(rid);

        loading.set(true);
        error.set(None);

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            let result = api_client.get_posts(&st.to_post_list_query()).await;
            if fetch_id.get_untracked() != rid {
                return;
            }
            match result {
                Ok(res) => {
                    posts.set(res.posts);
                    total.set(res.total);
                }
                Err(e) => app_state.report_error(error, e),
            }
            loading.set(false);
        });
    });

    let apply = move |next: ListState| {
        let target = format!("/posts{}", next.to_query_string());
        navigate.with_value(|nav| nav(&target, Default::default()));
        state.set(next);
    };

    let on_search = move || {
        let next = state.get_untracked().with_search(search_input.get_untracked().trim());
        apply(next);
    };

    let on_tag_click = Callback::new(move |tag: String| {
        let current = state.get_untracked();
        let next = if current.tag == tag {
            current.with_tag("")
        } else {
            current.with_tag(&tag)
        };
        search_input.set(String::new());
        apply(next);
    });

    let on_sort_change = move |ev: web_sys::Event| {
        use wasm_bindgen::JsCast;
        if let Some(select) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        {
            apply(state.get_untracked().with_sort(&select.value()));
        }
    };

    let page_count = move || total_pages(total.get(), PAGE_SIZE);

    view! {
        <div class="min-h-screen bg-background">
            <PageHeader />

            <main class="mx-auto w-full max-w-5xl px-4 py-8">
                <div class="mb-6 flex flex-col gap-3 sm:flex-row sm:items-center sm:justify-between">
                    <h1 class="text-2xl font-semibold">"Posts"</h1>

                    <div class="flex items-center gap-2">
                        <form
                            class="flex items-center gap-2"
                            on:submit=move |ev: web_sys::SubmitEvent| {
                                ev.prevent_default();
                                on_search();
                            }
                        >
                            <Input
                                id="search"
                                placeholder="Search posts"
                                bind_value=search_input
                                class="h-9 w-48 text-sm"
                            />
                            <Button size=ButtonSize::Sm>"Search"</Button>
                        </form>

                        <select
                            class="h-9 rounded-md border border-input bg-transparent px-2 text-sm outline-none"
                            on:change=on_sort_change
                            prop:value=move || state.get().sort_by
                        >
                            <option value="created_at">"Newest"</option>
                            <option value="view_count">"Most viewed"</option>
                            <option value="likes">"Most liked"</option>
                        </select>
                    </div>
                </div>

                <Show when=move || !state.get().tag.is_empty() fallback=|| ().into_view()>
                    <div class="mb-4 flex items-center gap-2 text-sm">
                        <span class="text-muted-foreground">"Filtered by tag:"</span>
                        <span class="rounded-full bg-primary px-2.5 py-0.5 text-xs font-medium text-primary-foreground">
                            {move || state.get().tag}
                        </span>
                        <button
                            type="button"
                            class="text-xs text-muted-foreground underline hover:text-foreground"
                            on:click=move |_| {
                                let next = state.get_untracked().with_tag("");
                                apply(next);
                            }
                        >
                            "Clear"
                        </button>
                    </div>
                </Show>

                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        error.get().map(|e| view! {
                            <Alert class="mb-4 border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        })
                    }}
                </Show>

                <Show when=move || !loading.get() fallback=move || view! {
                    <div class="flex items-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading posts…"
                    </div>
                }>
                    <Show
                        when=move || !posts.get().is_empty()
                        fallback=|| view! {
                            <p class="text-sm text-muted-foreground">"No posts match this filter."</p>
                        }
                    >
                        <div class="grid grid-cols-1 gap-5 sm:grid-cols-2">
                            {move || {
                                posts
                                    .get()
                                    .into_iter()
                                    .map(|post| view! { <PostCard post=post on_tag_click=on_tag_click /> })
                                    .collect_view()
                            }}
                        </div>
                    </Show>
                </Show>

                <Show when={move || page_count() > 1} fallback=|| ().into_view()>
                    <div class="mt-8 flex items-center justify-center gap-3 text-sm">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || state.get().page <= 1
                            on:click=move |_| {
                                let st = state.get_untracked();
                                let page = st.page - 1;
                                state.set(st.with_page(page));
                            }
                        >
                            "Previous"
                        </Button>
                        <span class="text-muted-foreground">
                            {move || format!("Page {} of {}", state.get().page, page_count())}
                        </span>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || state.get().page >= page_count()
                            on:click=move |_| {
                                let st = state.get_untracked();
                                let page = st.page + 1;
                                state.set(st.with_page(page));
                            }
                        >
                            "Next"
                        </Button>
                    </div>
                </Show>
            </main>

            <SiteFooter />
        </div>
    }
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct PostRouteParams {
    pub id: Option<String>,
}

#[component]
pub fn PostDetailPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = use_params::<PostRouteParams>();

    let post_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.id)
            .and_then(|raw| raw.parse::<i64>().ok())
    };

    let post: RwSignal<Option<Post>> = RwSignal::new(None);
    let not_found: RwSignal<bool> = RwSignal::new(false);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let liked: RwSignal<bool> = RwSignal::new(false);
    let liking: RwSignal<bool> = RwSignal::new(false);

    Effect::new(move |_| {
        let Some(id) = post_id() else {
            not_found.set(true);
            loading.set(false);
            return;
        };

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_post(id).await {
                Ok(p) => {
                    post.set(Some(p));
                    loading.set(false);

                    // Only a loaded post has a heart to fill in; the status
                    // check is cosmetic and a failure leaves it empty.
                    if let Ok(status) = api_client.check_like(id).await {
                        liked.set(status.liked);
                    }
                }
                Err(e) => {
                    if e.kind == ApiErrorKind::NotFound {
                        not_found.set(true);
                    } else {
                        app_state.report_error(error, e);
                    }
                    loading.set(false);
                }
            }
        });
    });

    let on_like = move |_| {
        let Some(id) = post_id() else {
            return;
        };
        if liking.get_untracked() {
            return;
        }
        liking.set(true);

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.like_post(id).await {
                Ok(res) => {
                    liked.set(res.liked);
                    post.update(|p| {
                        if let Some(p) = p {
                            p.likes = res.likes;
                        }
                    });
                }
                Err(e) => app_state.report_error(error, e),
            }
            liking.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <PageHeader />

            <main class="mx-auto w-full max-w-3xl px-4 py-8">
                <Show when=move || !loading.get() fallback=move || view! {
                    <div class="flex items-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading post…"
                    </div>
                }>
                    <Show
                        when=move || !not_found.get()
                        fallback=|| view! {
                            <div class="py-24 text-center">
                                <h1 class="text-2xl font-semibold">"Post not found"</h1>
                                <p class="mt-2 text-sm text-muted-foreground">
                                    "It may have been unpublished or deleted."
                                </p>
                                <a href="/posts" class="mt-4 inline-block text-sm text-primary hover:underline">
                                    "← Back to all posts"
                                </a>
                            </div>
                        }
                    >
                        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                            {move || {
                                error.get().map(|e| view! {
                                    <Alert class="mb-4 border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                    </Alert>
                                })
                            }}
                        </Show>

                        {move || {
                            post.get().map(|p| {
                                let cover = if p.cover_image.is_empty() {
                                    None
                                } else {
                                    let c = app_state.0.api_client.get_untracked();
                                    Some(c.absolute_asset_url(&p.cover_image))
                                };

                                view! {
                                    <article>
                                        {cover.map(|src| view! {
                                            <img
                                                class="mb-6 max-h-80 w-full rounded-xl object-cover"
                                                src=src
                                                alt=p.title.clone()
                                            />
                                        })}

                                        <h1 class="text-3xl font-bold tracking-tight">{p.title.clone()}</h1>

                                        <div class="mt-3 flex items-center gap-4 text-xs text-muted-foreground">
                                            <span>{format_date(&p.created_at)}</span>
                                            <span>{format!("{} views", p.view_count)}</span>
                                        </div>

                                        <div class="mt-3 flex flex-wrap gap-1.5">
                                            {p.tags
                                                .iter()
                                                .map(|tag| {
                                                    let href = format!(
                                                        "/posts{}",
                                                        ListState::default().with_tag(&tag.name).to_query_string()
                                                    );
                                                    view! {
                                                        <a
                                                            href=href
                                                            class="rounded-full px-2 py-0.5 text-xs font-medium text-white hover:opacity-80"
                                                            style=format!("background-color: {}", tag.color)
                                                        >
                                                            {tag.name.clone()}
                                                        </a>
                                                    }
                                                })
                                                .collect_view()}
                                        </div>

                                        <div class="prose mt-8 max-w-none whitespace-pre-wrap text-[15px] leading-7">
                                            {p.content.clone()}
                                        </div>

                                        <div class="mt-10 flex items-center justify-center border-t pt-8">
                                            <Button
                                                variant=ButtonVariant::Outline
                                                attr:disabled=move || liking.get()
                                                on:click=on_like
                                            >
                                                {move || if liked.get() { "♥" } else { "♡" }}
                                                <span>
                                                    {move || {
                                                        post.get().map(|p| p.likes.to_string()).unwrap_or_default()
                                                    }}
                                                </span>
                                            </Button>
                                        </div>
                                    </article>
                                }
                            })
                        }}
                    </Show>
                </Show>
            </main>

            <SiteFooter />
        </div>
    }
}

#[component]
pub fn TagsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let tags: RwSignal<Vec<Tag>> = RwSignal::new(vec![]);
    let posts: RwSignal<Vec<Post>> = RwSignal::new(vec![]);
    let selected: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    Effect::new(move |_| {
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_tags().await {
                Ok(list) => tags.set(list),
                Err(e) => {
                    app_state.report_error(error, e);
                    loading.set(false);
                    return;
                }
            }

            // One large page is enough for a personal blog; counts and the
            // per-tag listing both come from this snapshot.
            let mut query = ListState::default().to_post_list_query();
            query.limit = Some(1000);
            match api_client.get_posts(&query).await {
                Ok(res) => posts.set(res.posts),
                Err(e) => app_state.report_error(error, e),
            }
            loading.set(false);
        });
    });

    let count_for = move |name: &str| {
        posts
            .get()
            .iter()
            .filter(|p| p.tags.iter().any(|t| t.name == name))
            .count()
    };

    let filtered = move || match selected.get() {
        Some(name) => posts
            .get()
            .into_iter()
            .filter(|p| p.tags.iter().any(|t| t.name == name))
            .collect::<Vec<_>>(),
        None => vec![],
    };

    view! {
        <div class="min-h-screen bg-background">
            <PageHeader />

            <main class="mx-auto w-full max-w-4xl px-4 py-8">
                <h1 class="mb-6 text-2xl font-semibold">"Tags"</h1>

                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        error.get().map(|e| view! {
                            <Alert class="mb-4 border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        })
                    }}
                </Show>

                <Show when=move || !loading.get() fallback=move || view! {
                    <div class="flex items-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading tags…"
                    </div>
                }>
                    <div class="mb-8 flex flex-wrap gap-2">
                        {move || {
                            tags.get()
                                .into_iter()
                                .map(|tag| {
                                    let name = tag.name.clone();
                                    let name_for_click = name.clone();
                                    let count = count_for(&name);
                                    let active = selected.get() == Some(name.clone());
                                    let class = if active {
                                        "rounded-full px-3 py-1.5 text-sm font-medium text-white ring-2 ring-ring ring-offset-2"
                                    } else {
                                        "rounded-full px-3 py-1.5 text-sm font-medium text-white opacity-85 hover:opacity-100"
                                    };
                                    view! {
                                        <button
                                            type="button"
                                            class=class
                                            style=format!("background-color: {}", tag.color)
                                            on:click=move |_| {
                                                if selected.get_untracked() == Some(name_for_click.clone()) {
                                                    selected.set(None);
                                                } else {
                                                    selected.set(Some(name_for_click.clone()));
                                                }
                                            }
                                        >
                                            {format!("{} ({})", name, count)}
                                        </button>
                                    }
                                })
                                .collect_view()
                        }}
                    </div>

                    <Show
                        when=move || selected.get().is_some()
                        fallback=|| view! {
                            <p class="text-sm text-muted-foreground">"Pick a tag to see its posts."</p>
                        }
                    >
                        <div class="grid grid-cols-1 gap-5 sm:grid-cols-2">
                            {move || {
                                filtered()
                                    .into_iter()
                                    .map(|post| view! { <PostCard post=post /> })
                                    .collect_view()
                            }}
                        </div>
                    </Show>
                </Show>
            </main>

            <SiteFooter />
        </div>
    }
}

// ---------------------------------------------------------------------------
// Auth pages
// ---------------------------------------------------------------------------

#[component]
pub fn AdminLoginPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let username: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let loading: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let user = username.get_untracked();
        let pass = password.get_untracked();
        if user.trim().is_empty() || pass.is_empty() {
            error.set(Some("Username and password are required".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.login(user.trim(), &pass).await {
                Ok(res) => {
                    let mut api_client = app_state.0.api_client.get_untracked();
                    api_client.set_token(res.token);
                    api_client.save_to_storage();
                    app_state.0.api_client.set(api_client);

                    save_user_to_storage(&res.user);
                    app_state.0.current_user.set(Some(res.user));

                    navigate.with_value(|nav| nav("/admin", Default::default()));
                }
                Err(e) => {
                    error.set(Some(match e.kind {
                        ApiErrorKind::Unauthorized => {
                            "Invalid username or password".to_string()
                        }
                        _ => e.to_string(),
                    }));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="flex min-h-screen items-center justify-center bg-background px-4">
            <Card class="w-full max-w-sm">
                <CardHeader>
                    <CardTitle>"Admin sign in"</CardTitle>
                    <CardDescription>"Manage posts and tags."</CardDescription>
                </CardHeader>
                <CardContent>
                    <form class="space-y-4" on:submit=on_submit>
                        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                            {move || {
                                error.get().map(|e| view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                    </Alert>
                                })
                            }}
                        </Show>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="username" class="text-xs">"Username"</Label>
                            <Input id="username" name="username" bind_value=username required=true autofocus=true />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="password" class="text-xs">"Password"</Label>
                            <Input id="password" name="password" r#type="password" bind_value=password required=true />
                        </div>

                        <Button class="w-full" attr:disabled=move || loading.get()>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if loading.get() { "Signing in" } else { "Sign in" }}
                            </span>
                        </Button>

                        <p class="text-center text-xs text-muted-foreground">
                            "No account? "
                            <a href="/register" class="text-primary hover:underline">"Register"</a>
                        </p>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let username: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm: RwSignal<String> = RwSignal::new(String::new());
    let loading: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let user = username.get_untracked().trim().to_string();
        let pass = password.get_untracked();

        if user.is_empty() || pass.is_empty() {
            error.set(Some("Username and password are required".to_string()));
            return;
        }
        if pass.len() < 6 {
            error.set(Some("Password must be at least 6 characters".to_string()));
            return;
        }
        if pass != confirm.get_untracked() {
            error.set(Some("Passwords do not match".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        let mail = email.get_untracked().trim().to_string();
        let mail = if mail.is_empty() { None } else { Some(mail) };

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.register(&user, &pass, mail).await {
                Ok(_) => {
                    navigate.with_value(|nav| nav("/admin/login", Default::default()));
                }
                Err(e) => app_state.report_error(error, e),
            }
            loading.set(false);
        });
    };

    view! {
        <div class="flex min-h-screen items-center justify-center bg-background px-4">
            <Card class="w-full max-w-sm">
                <CardHeader>
                    <CardTitle>"Create an account"</CardTitle>
                    <CardDescription>"Registration requires admin approval to post."</CardDescription>
                </CardHeader>
                <CardContent>
                    <form class="space-y-4" on:submit=on_submit>
                        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                            {move || {
                                error.get().map(|e| view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                    </Alert>
                                })
                            }}
                        </Show>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="username" class="text-xs">"Username"</Label>
                            <Input id="username" name="username" bind_value=username required=true autofocus=true />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="email" class="text-xs">"Email (optional)"</Label>
                            <Input id="email" name="email" r#type="email" bind_value=email />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="password" class="text-xs">"Password"</Label>
                            <Input id="password" name="password" r#type="password" bind_value=password required=true />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="confirm" class="text-xs">"Confirm password"</Label>
                            <Input id="confirm" name="confirm" r#type="password" bind_value=confirm required=true />
                        </div>

                        <Button class="w-full" attr:disabled=move || loading.get()>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if loading.get() { "Creating account" } else { "Register" }}
                            </span>
                        </Button>

                        <p class="text-center text-xs text-muted-foreground">
                            "Already registered? "
                            <a href="/admin/login" class="text-primary hover:underline">"Sign in"</a>
                        </p>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

// ---------------------------------------------------------------------------
// Admin pages
// ---------------------------------------------------------------------------

/// Auth guard for the admin console. Unauthenticated viewers see the login
/// form in place.
#[component]
pub fn AdminAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=move || view! { <AdminLoginPage /> }>
            {move || children.with_value(|c| c())}
        </Show>
    }
}

#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let posts: RwSignal<Vec<Post>> = RwSignal::new(vec![]);
    let tags: RwSignal<Vec<Tag>> = RwSignal::new(vec![]);
    let users: RwSignal<Vec<User>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let reload: RwSignal<u32> = RwSignal::new(0);

    Effect::new(move |_| {
        reload.track();

        let api_client = app_state.0.api_client.get_untracked();
        let is_admin = app_state.0
            .current_user
            .get_untracked()
            .map(|u| u.is_admin())
            .unwrap_or(false);

        spawn_local(async move {
            let mut query = crate::api::PostListQuery::default();
            query.limit = Some(200);
            match api_client.get_posts(&query).await {
                Ok(res) => posts.set(res.posts),
                Err(e) => {
                    app_state.report_error(error, e);
                    loading.set(false);
                    return;
                }
            }

            match api_client.get_tags().await {
                Ok(list) => tags.set(list),
                Err(e) => app_state.report_error(error, e),
            }

            // User administration is admin-only on the backend too.
            if is_admin {
                match api_client.get_all_users().await {
                    Ok(list) => users.set(list),
                    Err(e) => app_state.report_error(error, e),
                }
            }

            loading.set(false);
        });
    });

    let on_delete_post = move |id: i64, title: String| {
        let confirmed = window()
            .confirm_with_message(&format!("Delete \"{}\"? This cannot be undone.", title))
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.delete_post(id).await {
                Ok(()) => reload.update(|n| *n += 1),
                Err(e) => app_state.report_error(error, e),
            }
        });
    };

    let published_count = move || posts.get().iter().filter(|p| p.published).count();
    let draft_count = move || posts.get().iter().filter(|p| !p.published).count();
    let total_views = move || posts.get().iter().map(|p| p.view_count).sum::<i64>();
    let total_likes = move || posts.get().iter().map(|p| p.likes).sum::<i64>();

    view! {
        <div class="min-h-screen bg-background">
            <PageHeader />

            <main class="mx-auto w-full max-w-5xl px-4 py-8">
                <div class="mb-6 flex items-center justify-between">
                    <div class="space-y-1">
                        <h1 class="text-2xl font-semibold">"Dashboard"</h1>
                        <p class="text-xs text-muted-foreground">
                            {move || {
                                app_state.0
                                    .current_user
                                    .get()
                                    .map(|u| format!("Signed in as {}", u.username))
                                    .unwrap_or_default()
                            }}
                        </p>
                    </div>

                    <div class="flex items-center gap-2">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| navigate.with_value(|nav| nav("/admin/tags", Default::default()))
                        >
                            "Manage tags"
                        </Button>
                        <Button
                            size=ButtonSize::Sm
                            on:click=move |_| navigate.with_value(|nav| nav("/admin/posts/new", Default::default()))
                        >
                            "New post"
                        </Button>
                    </div>
                </div>

                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        error.get().map(|e| view! {
                            <Alert class="mb-4 border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        })
                    }}
                </Show>

                <Show when=move || !loading.get() fallback=move || view! {
                    <div class="flex items-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading dashboard…"
                    </div>
                }>
                    <div class="mb-8 grid grid-cols-2 gap-4 sm:grid-cols-4">
                        <Card class="py-4">
                            <CardContent>
                                <p class="text-xs text-muted-foreground">"Published"</p>
                                <p class="text-2xl font-semibold">{move || published_count()}</p>
                            </CardContent>
                        </Card>
                        <Card class="py-4">
                            <CardContent>
                                <p class="text-xs text-muted-foreground">"Drafts"</p>
                                <p class="text-2xl font-semibold">{move || draft_count()}</p>
                            </CardContent>
                        </Card>
                        <Card class="py-4">
                            <CardContent>
                                <p class="text-xs text-muted-foreground">"Views"</p>
                                <p class="text-2xl font-semibold">{move || total_views()}</p>
                            </CardContent>
                        </Card>
                        <Card class="py-4">
                            <CardContent>
                                <p class="text-xs text-muted-foreground">"Likes"</p>
                                <p class="text-2xl font-semibold">{move || total_likes()}</p>
                            </CardContent>
                        </Card>
                    </div>

                    <Card class="mb-8">
                        <CardHeader>
                            <CardTitle>"Posts"</CardTitle>
                            <CardDescription>
                                {move || format!("{} total, drafts included", posts.get().len())}
                            </CardDescription>
                        </CardHeader>
                        <CardContent>
                            <Show
                                when=move || !posts.get().is_empty()
                                fallback=|| view! {
                                    <p class="text-sm text-muted-foreground">"No posts yet. Write the first one."</p>
                                }
                            >
                                <ul class="divide-y">
                                    {move || {
                                        posts
                                            .get()
                                            .into_iter()
                                            .map(|post| {
                                                let id = post.id;
                                                let title = post.title.clone();
                                                let title_for_delete = title.clone();
                                                view! {
                                                    <li class="flex items-center justify-between gap-4 py-3">
                                                        <div class="min-w-0">
                                                            <p class="truncate text-sm font-medium">{title}</p>
                                                            <p class="text-xs text-muted-foreground">
                                                                {format!(
                                                                    "{} · {} views · ♥ {}",
                                                                    format_date(&post.created_at),
                                                                    post.view_count,
                                                                    post.likes
                                                                )}
                                                            </p>
                                                        </div>

                                                        <div class="flex shrink-0 items-center gap-2">
                                                            {(!post.published).then(|| view! {
                                                                <span class="rounded-full bg-yellow-100 px-2 py-0.5 text-xs text-yellow-800">
                                                                    "Draft"
                                                                </span>
                                                            })}
                                                            <Button
                                                                variant=ButtonVariant::Outline
                                                                size=ButtonSize::Sm
                                                                on:click=move |_| {
                                                                    navigate.with_value(|nav| {
                                                                        nav(&format!("/admin/posts/{}/edit", id), Default::default())
                                                                    })
                                                                }
                                                            >
                                                                "Edit"
                                                            </Button>
                                                            <Button
                                                                variant=ButtonVariant::Destructive
                                                                size=ButtonSize::Sm
                                                                on:click=move |_| on_delete_post(id, title_for_delete.clone())
                                                            >
                                                                "Delete"
                                                            </Button>
                                                        </div>
                                                    </li>
                                                }
                                            })
                                            .collect_view()
                                    }}
                                </ul>
                            </Show>
                        </CardContent>
                    </Card>

                    <div class="grid grid-cols-1 gap-6 lg:grid-cols-2">
                        <Card>
                            <CardHeader>
                                <CardTitle>"Tags"</CardTitle>
                                <CardDescription>
                                    {move || format!("{} total", tags.get().len())}
                                </CardDescription>
                            </CardHeader>
                            <CardContent>
                                <div class="flex flex-wrap gap-2">
                                    {move || {
                                        tags.get()
                                            .into_iter()
                                            .map(|tag| view! {
                                                <span
                                                    class="rounded-full px-2.5 py-0.5 text-xs font-medium text-white"
                                                    style=format!("background-color: {}", tag.color)
                                                >
                                                    {tag.name}
                                                </span>
                                            })
                                            .collect_view()
                                    }}
                                </div>
                            </CardContent>
                        </Card>

                        <Show
                            when=move || app_state.is_admin()
                            fallback=|| ().into_view()
                        >
                            <UserAdminCard users=users error=error />
                        </Show>
                    </div>

                    <div class="mt-6">
                        <ChangePasswordCard error=error />
                    </div>
                </Show>
            </main>

            <SiteFooter />
        </div>
    }
}

/// User list with per-user password reset, visible to admins only.
#[component]
fn UserAdminCard(
    users: RwSignal<Vec<User>>,
    error: RwSignal<Option<String>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let notice: RwSignal<Option<String>> = RwSignal::new(None);

    let on_reset = move |user: User| {
        let prompted = window()
            .prompt_with_message(&format!("New password for {}:", user.username))
            .ok()
            .flatten()
            .unwrap_or_default();
        if prompted.len() < 6 {
            error.set(Some("Password must be at least 6 characters".to_string()));
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client
                .admin_change_user_password(user.id, &prompted)
                .await
            {
                Ok(_) => notice.set(Some(format!("Password updated for {}", user.username))),
                Err(e) => app_state.report_error(error, e),
            }
        });
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle>"Users"</CardTitle>
                <CardDescription>
                    {move || format!("{} registered", users.get().len())}
                </CardDescription>
            </CardHeader>
            <CardContent>
                <Show when=move || notice.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        notice.get().map(|n| view! {
                            <p class="mb-3 text-xs text-green-600">{n}</p>
                        })
                    }}
                </Show>

                <ul class="divide-y">
                    {move || {
                        users
                            .get()
                            .into_iter()
                            .map(|user| {
                                let user_for_reset = user.clone();
                                view! {
                                    <li class="flex items-center justify-between py-2">
                                        <div>
                                            <p class="text-sm font-medium">{user.username.clone()}</p>
                                            <p class="text-xs text-muted-foreground">{user.user_type.clone()}</p>
                                        </div>
                                        <Button
                                            variant=ButtonVariant::Outline
                                            size=ButtonSize::Sm
                                            on:click=move |_| on_reset(user_for_reset.clone())
                                        >
                                            "Reset password"
                                        </Button>
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </CardContent>
        </Card>
    }
}

/// Change-own-password form shown to every signed-in user.
#[component]
fn ChangePasswordCard(error: RwSignal<Option<String>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let old_password: RwSignal<String> = RwSignal::new(String::new());
    let new_password: RwSignal<String> = RwSignal::new(String::new());
    let confirm: RwSignal<String> = RwSignal::new(String::new());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let notice: RwSignal<Option<String>> = RwSignal::new(None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let old = old_password.get_untracked();
        let new = new_password.get_untracked();
        if new.len() < 6 {
            error.set(Some("Password must be at least 6 characters".to_string()));
            return;
        }
        if new != confirm.get_untracked() {
            error.set(Some("Passwords do not match".to_string()));
            return;
        }

        saving.set(true);
        notice.set(None);

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.change_password(&old, &new).await {
                Ok(_) => {
                    notice.set(Some("Password changed".to_string()));
                    old_password.set(String::new());
                    new_password.set(String::new());
                    confirm.set(String::new());
                }
                Err(e) => app_state.report_error(error, e),
            }
            saving.set(false);
        });
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle>"Change password"</CardTitle>
            </CardHeader>
            <CardContent>
                <form class="flex max-w-md flex-col gap-3" on:submit=on_submit>
                    <Show when=move || notice.get().is_some() fallback=|| ().into_view()>
                        {move || {
                            notice.get().map(|n| view! {
                                <p class="text-xs text-green-600">{n}</p>
                            })
                        }}
                    </Show>

                    <div class="flex flex-col gap-1.5">
                        <Label html_for="old_password" class="text-xs">"Current password"</Label>
                        <Input id="old_password" r#type="password" bind_value=old_password required=true />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="new_password" class="text-xs">"New password"</Label>
                        <Input id="new_password" r#type="password" bind_value=new_password required=true />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="confirm_password" class="text-xs">"Confirm new password"</Label>
                        <Input id="confirm_password" r#type="password" bind_value=confirm required=true />
                    </div>

                    <Button class="w-fit" size=ButtonSize::Sm attr:disabled=move || saving.get()>
                        {move || if saving.get() { "Saving…" } else { "Update password" }}
                    </Button>
                </form>
            </CardContent>
        </Card>
    }
}

const TAG_PALETTE: [&str; 8] = [
    "#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6", "#EC4899", "#14B8A6", "#64748B",
];

#[component]
pub fn TagManagerPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let tags: RwSignal<Vec<Tag>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let reload: RwSignal<u32> = RwSignal::new(0);

    let new_name: RwSignal<String> = RwSignal::new(String::new());
    let new_color: RwSignal<String> = RwSignal::new(TAG_PALETTE[0].to_string());

    // Inline editing: at most one tag row is in edit mode.
    let editing_id: RwSignal<Option<i64>> = RwSignal::new(None);
    let edit_name: RwSignal<String> = RwSignal::new(String::new());
    let edit_color: RwSignal<String> = RwSignal::new(String::new());

    Effect::new(move |_| {
        reload.track();
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_tags().await {
                Ok(list) => tags.set(list),
                Err(e) => app_state.report_error(error, e),
            }
            loading.set(false);
        });
    });

    let on_create = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get_untracked().trim().to_string();
        if name.is_empty() {
            return;
        }

        let color = new_color.get_untracked();
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.create_tag(&name, &color).await {
                Ok(_) => {
                    new_name.set(String::new());
                    reload.update(|n| *n += 1);
                }
                Err(e) => app_state.report_error(error, e),
            }
        });
    };

    let on_save_edit = move || {
        let Some(id) = editing_id.get_untracked() else {
            return;
        };
        let name = edit_name.get_untracked().trim().to_string();
        if name.is_empty() {
            return;
        }

        let color = edit_color.get_untracked();
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.update_tag(id, &name, &color).await {
                Ok(_) => {
                    editing_id.set(None);
                    reload.update(|n| *n += 1);
                }
                Err(e) => app_state.report_error(error, e),
            }
        });
    };

    let on_delete = move |id: i64, name: String| {
        let confirmed = window()
            .confirm_with_message(&format!("Delete tag \"{}\"?", name))
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.delete_tag(id).await {
                Ok(()) => reload.update(|n| *n += 1),
                Err(e) => app_state.report_error(error, e),
            }
        });
    };

    let palette_picker = move |target: RwSignal<String>| {
        view! {
            <div class="flex items-center gap-1.5">
                {TAG_PALETTE
                    .iter()
                    .map(|&color| {
                        let class = move || {
                            if target.get() == color {
                                "size-6 rounded-full ring-2 ring-ring ring-offset-1"
                            } else {
                                "size-6 rounded-full hover:opacity-80"
                            }
                        };
                        view! {
                            <button
                                type="button"
                                class=class
                                style=format!("background-color: {}", color)
                                on:click=move |_| target.set(color.to_string())
                            />
                        }
                    })
                    .collect_view()}
            </div>
        }
    };

    view! {
        <div class="min-h-screen bg-background">
            <PageHeader />

            <main class="mx-auto w-full max-w-3xl px-4 py-8">
                <div class="mb-6 flex items-center justify-between">
                    <h1 class="text-2xl font-semibold">"Tags"</h1>
                    <a href="/admin" class="text-sm text-primary hover:underline">"← Dashboard"</a>
                </div>

                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        error.get().map(|e| view! {
                            <Alert class="mb-4 border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        })
                    }}
                </Show>

                <Card class="mb-6">
                    <CardHeader>
                        <CardTitle>"New tag"</CardTitle>
                    </CardHeader>
                    <CardContent>
                        <form class="flex flex-wrap items-center gap-3" on:submit=on_create>
                            <Input
                                id="tag_name"
                                placeholder="Tag name"
                                bind_value=new_name
                                class="h-9 max-w-xs"
                                required=true
                            />
                            {palette_picker(new_color)}
                            <Button size=ButtonSize::Sm>"Create"</Button>
                        </form>
                    </CardContent>
                </Card>

                <Show when=move || !loading.get() fallback=move || view! {
                    <div class="flex items-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading tags…"
                    </div>
                }>
                    <Card>
                        <CardContent>
                            <Show
                                when=move || !tags.get().is_empty()
                                fallback=|| view! {
                                    <p class="text-sm text-muted-foreground">"No tags yet."</p>
                                }
                            >
                                <ul class="divide-y">
                                    {move || {
                                        tags.get()
                                            .into_iter()
                                            .map(|tag| {
                                                let id = tag.id;
                                                let name = tag.name.clone();
                                                let name_for_delete = name.clone();
                                                let name_for_edit = name.clone();
                                                let color_for_edit = tag.color.clone();
                                                let is_editing = move || editing_id.get() == Some(id);

                                                view! {
                                                    <li class="flex items-center justify-between gap-3 py-3">
                                                        <Show
                                                            when=is_editing
                                                            fallback={
                                                                let name = name.clone();
                                                                let color = tag.color.clone();
                                                                move || view! {
                                                                    <span
                                                                        class="rounded-full px-3 py-1 text-sm font-medium text-white"
                                                                        style=format!("background-color: {}", color)
                                                                    >
                                                                        {name.clone()}
                                                                    </span>
                                                                }
                                                            }
                                                        >
                                                            <div class="flex flex-wrap items-center gap-3">
                                                                <Input
                                                                    id="edit_tag_name"
                                                                    bind_value=edit_name
                                                                    class="h-8 max-w-[10rem] text-sm"
                                                                />
                                                                {palette_picker(edit_color)}
                                                            </div>
                                                        </Show>

                                                        <div class="flex shrink-0 items-center gap-2">
                                                            <Show
                                                                when=is_editing
                                                                fallback={
                                                                    let name_for_edit = name_for_edit.clone();
                                                                    let color_for_edit = color_for_edit.clone();
                                                                    move || {
                                                                        let name_for_edit = name_for_edit.clone();
                                                                        let color_for_edit = color_for_edit.clone();
                                                                        view! {
                                                                            <Button
                                                                                variant=ButtonVariant::Outline
                                                                                size=ButtonSize::Sm
                                                                                on:click=move |_| {
                                                                                    edit_name.set(name_for_edit.clone());
                                                                                    edit_color.set(color_for_edit.clone());
                                                                                    editing_id.set(Some(id));
                                                                                }
                                                                            >
                                                                                "Edit"
                                                                            </Button>
                                                                        }
                                                                    }
                                                                }
                                                            >
                                                                <Button
                                                                    size=ButtonSize::Sm
                                                                    on:click=move |_| on_save_edit()
                                                                >
                                                                    "Save"
                                                                </Button>
                                                                <Button
                                                                    variant=ButtonVariant::Outline
                                                                    size=ButtonSize::Sm
                                                                    on:click=move |_| editing_id.set(None)
                                                                >
                                                                    "Cancel"
                                                                </Button>
                                                            </Show>

                                                            <Button
                                                                variant=ButtonVariant::Destructive
                                                                size=ButtonSize::Sm
                                                                on:click=move |_| on_delete(id, name_for_delete.clone())
                                                            >
                                                                "Delete"
                                                            </Button>
                                                        </div>
                                                    </li>
                                                }
                                            })
                                            .collect_view()
                                    }}
                                </ul>
                            </Show>
                        </CardContent>
                    </Card>
                </Show>
            </main>

            <SiteFooter />
        </div>
    }
}
