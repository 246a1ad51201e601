use crate::models::Post;
use crate::state::AppContext;
use crate::util::format_date;
use leptos::prelude::*;

/// Summary card used by the home page and the post list. Clicking a tag chip
/// notifies the parent instead of navigating directly, so each page decides
/// what a tag click means.
#[component]
pub fn PostCard(
    post: Post,
    #[prop(into, optional)] on_tag_click: Option<Callback<String>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let href = format!("/posts/{}", post.id);
    let cover = if post.cover_image.is_empty() {
        None
    } else {
        Some(
            app_state
                .0
                .api_client
                .get_untracked()
                .absolute_asset_url(&post.cover_image),
        )
    };

    let summary = if post.summary.is_empty() {
        let mut s: String = post.content.chars().take(120).collect();
        if post.content.chars().count() > 120 {
            s.push('…');
        }
        s
    } else {
        post.summary.clone()
    };

    view! {
        <article class="flex flex-col overflow-hidden rounded-xl border bg-card shadow-sm transition-shadow hover:shadow-md">
            {cover.map(|src| view! {
                <a href=href.clone() class="block">
                    <img class="h-40 w-full object-cover" src=src alt=post.title.clone() />
                </a>
            })}

            <div class="flex flex-1 flex-col gap-2 p-4">
                <a href=href.clone() class="text-base font-semibold leading-snug hover:text-primary">
                    {post.title.clone()}
                </a>

                <p class="flex-1 text-sm text-muted-foreground">{summary}</p>

                <div class="flex flex-wrap gap-1.5">
                    {post
                        .tags
                        .iter()
                        .map(|tag| {
                            let name = tag.name.clone();
                            let color = tag.color.clone();
                            match on_tag_click {
                                Some(cb) => {
                                    let name_for_click = name.clone();
                                    view! {
                                        <button
                                            type="button"
                                            class="rounded-full px-2 py-0.5 text-xs font-medium text-white hover:opacity-80"
                                            style=format!("background-color: {}", color)
                                            on:click=move |_| cb.run(name_for_click.clone())
                                        >
                                            {name}
                                        </button>
                                    }
                                    .into_any()
                                }
                                None => view! {
                                    <span
                                        class="rounded-full px-2 py-0.5 text-xs font-medium text-white"
                                        style=format!("background-color: {}", color)
                                    >
                                        {name}
                                    </span>
                                }
                                .into_any(),
                            }
                        })
                        .collect_view()}
                </div>

                <div class="flex items-center justify-between pt-1 text-xs text-muted-foreground">
                    <span>{format_date(&post.created_at)}</span>
                    <span class="flex items-center gap-3">
                        <span>{format!("{} views", post.view_count)}</span>
                        <span>{format!("♥ {}", post.likes)}</span>
                    </span>
                </div>
            </div>
        </article>
    }
}
