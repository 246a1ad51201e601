mod draft;

pub(crate) use draft::{
    placeholder_token, remove_placeholder, resolve_placeholder, splice_placeholder, AutosaveState,
    PostDraft, AUTOSAVE_DEBOUNCE_MS,
};

use crate::components::chrome::{SiteFooter, SiteHeader};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Input, Label, Spinner,
};
use crate::models::Tag;
use crate::state::AppContext;
use crate::util::{format_time_ms, now_ms};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params};
use leptos_router::params::Params;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct EditorRouteParams {
    pub id: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ViewMode {
    Edit,
    Split,
    Preview,
}

/// Read a browser File into memory for a multipart upload.
async fn file_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buf = JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| "Failed to read file".to_string())?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

#[component]
pub fn PostEditorPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = use_params::<EditorRouteParams>();
    let navigate = StoredValue::new(use_navigate());

    // `/admin/posts/new` has no id; `/admin/posts/:id/edit` does. Autosave is
    // only armed in the latter case.
    let post_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.id)
            .and_then(|raw| raw.parse::<i64>().ok())
    };
    let is_editing = move || post_id().is_some();

    let draft: RwSignal<PostDraft> = RwSignal::new(PostDraft::default());
    let autosave: RwSignal<AutosaveState> = RwSignal::new(AutosaveState::default());

    // Tag snapshot, fetched once per editor session.
    let tags: RwSignal<Vec<Tag>> = RwSignal::new(vec![]);
    let tags_loaded: RwSignal<bool> = RwSignal::new(false);

    let loading: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let view_mode: RwSignal<ViewMode> = RwSignal::new(ViewMode::Edit);
    let new_tag: RwSignal<String> = RwSignal::new(String::new());

    // Explicit debounce handle: cancelled and recreated on each qualifying
    // mutation, cancelled for good when the page unmounts.
    let autosave_timer_id: RwSignal<Option<i32>> = RwSignal::new(None);
    // Stale-response guard: only the latest issued autosave applies.
    let autosave_req_id: RwSignal<u64> = RwSignal::new(0);
    // Per-paste placeholder sequence.
    let upload_seq: RwSignal<u64> = RwSignal::new(0);

    let content_ref: NodeRef<html::Textarea> = NodeRef::new();

    let cancel_autosave_timer = move || {
        if let Some(win) = web_sys::window() {
            if let Some(tid) = autosave_timer_id.get_untracked() {
                let _ = win.clear_timeout_with_handle(tid);
            }
        }
        autosave_timer_id.set(None);
    };

    let do_autosave = move || {
        let Some(id) = post_id() else {
            return;
        };
        if !autosave.get_untracked().should_autosave(Some(id)) {
            return;
        }

        autosave.update(|st| st.begin_autosave());

        let rid = autosave_req_id.get_untracked().saturating_add(1);
        autosave_req_id.set(rid);

        let payload = {
            let d = draft.get_untracked();
            d.payload(d.published)
        };
        let api_client = app_state.0.api_client.get_untracked();

        spawn_local(async move {
            let result = api_client.update_post(id, &payload).await;

            // A newer autosave owns the state now; drop this response, but
            // still clear the in-flight flag so the cycle can restart.
            if autosave_req_id.get_untracked() != rid {
                autosave.update(|st| st.finish_autosave(false, now_ms()));
                return;
            }

            match result {
                Ok(_) => {
                    autosave.update(|st| st.finish_autosave(true, now_ms()));
                }
                Err(e) => {
                    autosave.update(|st| st.finish_autosave(false, now_ms()));
                    if e.ends_session() {
                        app_state.force_relogin();
                    } else {
                        // Silent: the dirty flag stays set and the
                        // next timer or manual save retries.
                        web_sys::console::warn_1(
                            &format!("autosave failed: {}", e).into(),
                        );
                    }
                }
            }
        });
    };

    // Every qualifying mutation restarts the 30s idle timer (debounce, not
    // interval). New posts have nothing to save against, so no timer.
    let schedule_autosave = move || {
        if !is_editing() {
            return;
        }
        let Some(win) = web_sys::window() else {
            return;
        };

        cancel_autosave_timer();

        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            autosave_timer_id.set(None);
            do_autosave();
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                AUTOSAVE_DEBOUNCE_MS,
            )
            .unwrap_or(0);
        autosave_timer_id.set(Some(tid));
    };

    let mark_dirty = move || {
        autosave.update(|st| st.mark_dirty());
        schedule_autosave();
    };

    on_cleanup(move || {
        cancel_autosave_timer();
    });

    // Tag snapshot, once per session.
    Effect::new(move |_| {
        if tags_loaded.get() {
            return;
        }
        tags_loaded.set(true);

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_tags().await {
                Ok(list) => tags.set(list),
                Err(e) => {
                    web_sys::console::warn_1(&format!("failed to load tags: {}", e).into());
                }
            }
        });
    });

    // Hydrate the draft when editing an existing post. A missing post sends
    // the viewer back to the admin listing.
    let hydrated_post_id: RwSignal<Option<i64>> = RwSignal::new(None);
    Effect::new(move |_| {
        let Some(id) = post_id() else {
            return;
        };
        if hydrated_post_id.get_untracked() == Some(id) {
            return;
        }
        hydrated_post_id.set(Some(id));

        loading.set(true);
        error.set(None);

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_post(id).await {
                Ok(post) => {
                    draft.set(PostDraft::from_post(&post));
                    autosave.set(AutosaveState::default());
                }
                Err(e) => {
                    if e.ends_session() {
                        app_state.force_relogin();
                    } else {
                        // NotFound or fetch failure: the editor has nothing to
                        // edit, leave.
                        navigate.with_value(|nav| nav("/admin", Default::default()));
                    }
                }
            }
            loading.set(false);
        });
    });

    let on_title_input = move |ev: web_sys::Event| {
        if let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            draft.update(|d| d.title = input.value());
            mark_dirty();
        }
    };

    let on_summary_input = move |ev: web_sys::Event| {
        if let Some(area) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        {
            draft.update(|d| d.summary = area.value());
            mark_dirty();
        }
    };

    let on_content_input = move |ev: web_sys::Event| {
        if let Some(area) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        {
            draft.update(|d| d.content = area.value());
            mark_dirty();
        }
    };

    let on_toggle_tag = move |name: String| {
        draft.update(|d| d.toggle_tag(&name));
        mark_dirty();
    };

    let on_add_new_tag = move || {
        let raw = new_tag.get_untracked();
        let mut added = false;
        draft.update(|d| added = d.add_new_tag_name(&raw));
        if added {
            new_tag.set(String::new());
            mark_dirty();
        }
    };

    // Clipboard image paste: splice a unique placeholder at the cursor, then
    // swap it for the uploaded image reference (or remove it on failure).
    let on_content_paste = move |ev: web_sys::ClipboardEvent| {
        let Some(data) = ev.clipboard_data() else {
            return;
        };
        let items = data.items();

        let mut image: Option<web_sys::File> = None;
        for i in 0..items.length() {
            let Some(item) = items.get(i) else {
                continue;
            };
            if item.type_().contains("image") {
                if let Ok(Some(file)) = item.get_as_file() {
                    image = Some(file);
                    break;
                }
            }
        }

        // No image payload: fall through to default paste behavior.
        let Some(file) = image else {
            return;
        };
        ev.prevent_default();

        let seq = upload_seq.get_untracked().saturating_add(1);
        upload_seq.set(seq);
        let token = placeholder_token(seq);

        let cursor = content_ref
            .get_untracked()
            .and_then(|el| el.selection_start().ok().flatten())
            .unwrap_or_else(|| {
                draft.get_untracked().content.encode_utf16().count() as u32
            });

        draft.update(|d| d.content = splice_placeholder(&d.content, cursor, &token));

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            let filename = if file.name().is_empty() {
                "pasted.png".to_string()
            } else {
                file.name()
            };
            let mime = if file.type_().is_empty() {
                "image/png".to_string()
            } else {
                file.type_()
            };

            let uploaded = match file_bytes(&file).await {
                Ok(bytes) => api_client.upload_file(&filename, &mime, bytes).await,
                Err(e) => {
                    draft.update(|d| d.content = remove_placeholder(&d.content, &token));
                    error.set(Some(format!("Image upload failed: {}", e)));
                    return;
                }
            };

            match uploaded {
                Ok(res) => {
                    let url = api_client.absolute_asset_url(&res.url);
                    draft.update(|d| {
                        if let Some(next) = resolve_placeholder(&d.content, &token, &url) {
                            d.content = next;
                        }
                    });
                    mark_dirty();
                }
                Err(e) => {
                    draft.update(|d| d.content = remove_placeholder(&d.content, &token));
                    if e.ends_session() {
                        app_state.force_relogin();
                    } else {
                        error.set(Some(format!("Image upload failed: {}", e)));
                    }
                }
            }
        });
    };

    let on_cover_change = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|fs| fs.get(0)) else {
            return;
        };

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            let uploaded = match file_bytes(&file).await {
                Ok(bytes) => {
                    api_client
                        .upload_file(&file.name(), &file.type_(), bytes)
                        .await
                }
                Err(e) => {
                    error.set(Some(format!("Cover upload failed: {}", e)));
                    return;
                }
            };

            match uploaded {
                Ok(res) => {
                    draft.update(|d| d.cover_image = res.url.clone());
                    mark_dirty();
                }
                Err(e) => {
                    if e.ends_session() {
                        app_state.force_relogin();
                    } else {
                        // Draft left unchanged so the previous cover survives.
                        error.set(Some(format!("Cover upload failed: {}", e)));
                    }
                }
            }
        });
    };

    // "Save as draft" and "Publish" share the submit path; only the intent
    // differs, and it overrides the draft's published flag for this request.
    let submit = move |publish_intent: bool| {
        if saving.get_untracked() {
            return;
        }
        let d = draft.get_untracked();
        if !d.is_submittable() {
            error.set(Some("Title and content are required".to_string()));
            return;
        }

        saving.set(true);
        error.set(None);
        cancel_autosave_timer();

        let payload = d.payload(publish_intent);
        let id = post_id();
        let api_client = app_state.0.api_client.get_untracked();

        spawn_local(async move {
            let result = match id {
                Some(id) => api_client.update_post(id, &payload).await,
                None => api_client.create_post(&payload).await,
            };

            match result {
                Ok(_) => {
                    autosave.update(|st| st.mark_submitted(now_ms()));
                    navigate.with_value(|nav| nav("/admin", Default::default()));
                }
                Err(e) => {
                    if e.ends_session() {
                        app_state.force_relogin();
                    } else {
                        // Draft retained unchanged so the user can retry.
                        error.set(Some(format!("Failed to save post: {}", e)));
                    }
                }
            }
            saving.set(false);
        });
    };

    let on_logout = Callback::new(move |_: ()| {
        app_state.logout();
        let _ = window().location().set_href("/");
    });

    let mode_button_class = move |mode: ViewMode| {
        if view_mode.get() == mode {
            "bg-primary text-primary-foreground"
        } else {
            "bg-muted text-muted-foreground hover:bg-accent"
        }
    };

    let textarea_class = "w-full rounded-md border border-input bg-transparent px-3 py-2 \
         font-mono text-sm shadow-xs outline-none focus-visible:border-ring \
         focus-visible:ring-2 focus-visible:ring-ring/50";

    view! {
        <div class="min-h-screen bg-background">
            <SiteHeader is_admin=Signal::derive(move || true) on_logout=on_logout />

            <main class="mx-auto w-full max-w-4xl px-4 py-8">
                <Show when=move || !loading.get() fallback=move || view! {
                    <div class="flex items-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading post…"
                    </div>
                }>
                    <div class="mb-6 flex items-center justify-between">
                        <div class="space-y-1">
                            <h1 class="text-2xl font-semibold">
                                {move || if is_editing() { "Edit post" } else { "New post" }}
                            </h1>
                            <p class="text-xs text-muted-foreground">"Write the content in Markdown."</p>
                        </div>

                        <div class="flex items-center gap-3 text-xs">
                            <Show when=move || autosave.get().autosaving fallback=|| ().into_view()>
                                <span class="inline-flex items-center gap-1 text-primary">
                                    <Spinner />
                                    "Autosaving…"
                                </span>
                            </Show>
                            <Show
                                when=move || {
                                    let st = autosave.get();
                                    !st.autosaving && st.last_saved_at_ms.is_some()
                                }
                                fallback=|| ().into_view()
                            >
                                <span class="text-green-600">
                                    {move || {
                                        autosave
                                            .get()
                                            .last_saved_at_ms
                                            .map(|ms| format!("Saved at {}", format_time_ms(ms)))
                                            .unwrap_or_default()
                                    }}
                                </span>
                            </Show>
                            <Show
                                when=move || {
                                    let st = autosave.get();
                                    st.has_unsaved_changes && !st.autosaving
                                }
                                fallback=|| ().into_view()
                            >
                                <span class="text-yellow-600">"Unsaved changes"</span>
                            </Show>
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

                    <div class="space-y-5 rounded-xl border bg-card p-6 shadow-sm">
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="title" class="text-xs">"Title"</Label>
                            <input
                                id="title"
                                type="text"
                                required=true
                                class="h-9 w-full rounded-md border border-input bg-transparent px-3 text-sm shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50"
                                placeholder="Post title"
                                prop:value=move || draft.get().title
                                on:input=on_title_input
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="summary" class="text-xs">"Summary (optional)"</Label>
                            <textarea
                                id="summary"
                                rows=3
                                class=textarea_class
                                placeholder="Short summary shown on list pages"
                                prop:value=move || draft.get().summary
                                on:input=on_summary_input
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label class="text-xs">"Cover image"</Label>
                            <div class="flex items-center gap-4">
                                <input
                                    type="file"
                                    accept="image/*"
                                    class="block w-full text-sm text-muted-foreground file:mr-4 file:rounded-full file:border-0 file:bg-muted file:px-4 file:py-2 file:text-sm file:font-medium"
                                    on:change=on_cover_change
                                />
                                <Show
                                    when=move || !draft.get().cover_image.is_empty()
                                    fallback=|| ().into_view()
                                >
                                    <img
                                        class="h-20 w-20 rounded object-cover"
                                        src=move || {
                                            let c = app_state.0.api_client.get();
                                            c.absolute_asset_url(&draft.get().cover_image)
                                        }
                                        alt="Cover preview"
                                    />
                                </Show>
                            </div>
                        </div>

                        <div class="flex flex-col gap-2">
                            <Label class="text-xs">"Tags"</Label>
                            <div class="flex flex-wrap gap-2">
                                {move || {
                                    let selected = draft.get().tag_names;
                                    tags.get()
                                        .into_iter()
                                        .map(|tag| {
                                            let name = tag.name.clone();
                                            let name_for_click = name.clone();
                                            let active = selected.iter().any(|t| *t == name);
                                            let class = if active {
                                                "rounded-full px-3 py-1 text-xs font-medium text-white ring-2 ring-ring ring-offset-2"
                                            } else {
                                                "rounded-full px-3 py-1 text-xs font-medium text-white opacity-80 hover:opacity-100"
                                            };
                                            view! {
                                                <button
                                                    type="button"
                                                    class=class
                                                    style=format!("background-color: {}", tag.color)
                                                    on:click=move |_| on_toggle_tag(name_for_click.clone())
                                                >
                                                    {name}
                                                </button>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </div>

                            <div class="flex items-center gap-2">
                                <Input
                                    id="new_tag"
                                    placeholder="Add a new tag"
                                    bind_value=new_tag
                                    class="h-8 max-w-xs text-sm"
                                />
                                <Button
                                    variant=ButtonVariant::Secondary
                                    size=ButtonSize::Sm
                                    on:click=move |_| on_add_new_tag()
                                >
                                    "Add"
                                </Button>
                            </div>
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <div class="flex items-center justify-between">
                                <Label html_for="content" class="text-xs">"Content (Markdown)"</Label>
                                <div class="flex items-center gap-1">
                                    <button
                                        type="button"
                                        class=move || format!("rounded-md px-3 py-1 text-xs {}", mode_button_class(ViewMode::Edit))
                                        on:click=move |_| view_mode.set(ViewMode::Edit)
                                    >
                                        "Edit"
                                    </button>
                                    <button
                                        type="button"
                                        class=move || format!("rounded-md px-3 py-1 text-xs {}", mode_button_class(ViewMode::Split))
                                        on:click=move |_| view_mode.set(ViewMode::Split)
                                    >
                                        "Split"
                                    </button>
                                    <button
                                        type="button"
                                        class=move || format!("rounded-md px-3 py-1 text-xs {}", mode_button_class(ViewMode::Preview))
                                        on:click=move |_| view_mode.set(ViewMode::Preview)
                                    >
                                        "Preview"
                                    </button>
                                </div>
                            </div>

                            <div class=move || {
                                if view_mode.get() == ViewMode::Split {
                                    "grid grid-cols-2 gap-4"
                                } else {
                                    "grid grid-cols-1"
                                }
                            }>
                                <Show when=move || view_mode.get() != ViewMode::Preview fallback=|| ().into_view()>
                                    <textarea
                                        id="content"
                                        rows=20
                                        class=textarea_class
                                        placeholder="Write in Markdown. Paste an image to upload it inline."
                                        prop:value=move || draft.get().content
                                        on:input=on_content_input
                                        on:paste=on_content_paste
                                        node_ref=content_ref
                                    />
                                </Show>
                                <Show when=move || view_mode.get() != ViewMode::Edit fallback=|| ().into_view()>
                                    <pre class="min-h-48 overflow-auto whitespace-pre-wrap rounded-md border border-input bg-muted/30 p-4 text-sm">
                                        {move || {
                                            let content = draft.get().content;
                                            if content.is_empty() {
                                                "Nothing to preview.".to_string()
                                            } else {
                                                content
                                            }
                                        }}
                                    </pre>
                                </Show>
                            </div>
                        </div>

                        <div class="flex items-center justify-between pt-2">
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=move |_| navigate.with_value(|nav| nav("/admin", Default::default()))
                            >
                                "Cancel"
                            </Button>

                            <div class="flex items-center gap-2">
                                <Button
                                    variant=ButtonVariant::Secondary
                                    size=ButtonSize::Sm
                                    attr:disabled=move || saving.get()
                                    on:click=move |_| submit(false)
                                >
                                    {move || if saving.get() { "Saving…" } else { "Save as draft" }}
                                </Button>
                                <Button
                                    size=ButtonSize::Sm
                                    attr:disabled=move || saving.get()
                                    on:click=move |_| submit(true)
                                >
                                    {move || {
                                        if saving.get() {
                                            "Publishing…"
                                        } else if is_editing() {
                                            "Update & publish"
                                        } else {
                                            "Publish"
                                        }
                                    }}
                                </Button>
                            </div>
                        </div>
                    </div>
                </Show>
            </main>

            <SiteFooter />
        </div>
    }
}
