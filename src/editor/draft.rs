use crate::models::{CreatePostData, Post};

/// Idle time after the last edit before an autosave fires.
pub(crate) const AUTOSAVE_DEBOUNCE_MS: i32 = 30_000;

/// In-memory state of the post being authored. Nothing here touches the
/// network; persistence happens only through an explicit submit or the
/// autosave controller.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PostDraft {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub cover_image: String,
    pub published: bool,
    /// Selected tag names, insertion order preserved for display.
    pub tag_names: Vec<String>,
}

impl PostDraft {
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            summary: post.summary.clone(),
            cover_image: post.cover_image.clone(),
            published: post.published,
            tag_names: post.tags.iter().map(|t| t.name.clone()).collect(),
        }
    }

    /// Adds the tag if absent, removes it otherwise. Existence server-side is
    /// not checked here; the backend resolves names on submit.
    pub fn toggle_tag(&mut self, name: &str) {
        if let Some(pos) = self.tag_names.iter().position(|t| t == name) {
            self.tag_names.remove(pos);
        } else {
            self.tag_names.push(name.to_string());
        }
    }

    /// Free-text tag addition. Returns false for blank input and duplicates.
    pub fn add_new_tag_name(&mut self, raw: &str) -> bool {
        let name = raw.trim();
        if name.is_empty() || self.tag_names.iter().any(|t| t == name) {
            return false;
        }
        self.tag_names.push(name.to_string());
        true
    }

    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }

    /// Outgoing payload. `publish_intent` overrides the draft's `published`
    /// field for this request only; the draft itself is left untouched.
    pub fn payload(&self, publish_intent: bool) -> CreatePostData {
        CreatePostData {
            title: self.title.clone(),
            content: self.content.clone(),
            summary: self.summary.clone(),
            cover_image: self.cover_image.clone(),
            published: publish_intent,
            tag_names: self.tag_names.clone(),
        }
    }
}

/// Dirty/saved bookkeeping for the autosave loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct AutosaveState {
    pub has_unsaved_changes: bool,
    pub last_saved_at_ms: Option<i64>,
    pub autosaving: bool,
}

impl AutosaveState {
    pub fn mark_dirty(&mut self) {
        self.has_unsaved_changes = true;
    }

    /// Autosave only runs for an existing post with pending edits, and never
    /// while another autosave request is in flight.
    pub fn should_autosave(&self, post_id: Option<i64>) -> bool {
        post_id.is_some() && self.has_unsaved_changes && !self.autosaving
    }

    pub fn begin_autosave(&mut self) {
        self.autosaving = true;
    }

    /// Always called regardless of outcome; the `autosaving` flag never
    /// survives a finished request.
    pub fn finish_autosave(&mut self, success: bool, now_ms: i64) {
        self.autosaving = false;
        if success {
            self.has_unsaved_changes = false;
            self.last_saved_at_ms = Some(now_ms);
        }
    }

    pub fn mark_submitted(&mut self, now_ms: i64) {
        self.has_unsaved_changes = false;
        self.last_saved_at_ms = Some(now_ms);
    }
}

/// Placeholder spliced into the content while a pasted image uploads. Each
/// upload gets its own sequence number so concurrent pastes never collide on
/// the replace step.
pub(crate) fn placeholder_token(seq: u64) -> String {
    format!("![上传中...](#uploading-{seq})")
}

/// Textarea cursor offsets are UTF-16 code units; map one to a byte offset in
/// the Rust string, clamping to the end.
pub(crate) fn utf16_to_byte_index(s: &str, utf16_idx: u32) -> usize {
    let mut remaining = utf16_idx as usize;
    for (byte_idx, ch) in s.char_indices() {
        if remaining == 0 {
            return byte_idx;
        }
        let units = ch.len_utf16();
        if remaining < units {
            // Cursor inside a surrogate pair; snap to the char boundary.
            return byte_idx;
        }
        remaining -= units;
    }
    s.len()
}

pub(crate) fn splice_placeholder(content: &str, cursor_utf16: u32, token: &str) -> String {
    let at = utf16_to_byte_index(content, cursor_utf16);
    let mut out = String::with_capacity(content.len() + token.len());
    out.push_str(&content[..at]);
    out.push_str(token);
    out.push_str(&content[at..]);
    out
}

/// Replace the first occurrence of `token` with an inline markdown image.
/// Returns None when the placeholder is no longer present (e.g. the user
/// deleted it while the upload was in flight).
pub(crate) fn resolve_placeholder(content: &str, token: &str, image_url: &str) -> Option<String> {
    if !content.contains(token) {
        return None;
    }
    Some(content.replacen(token, &format!("![图片]({})", image_url), 1))
}

/// Drop the first occurrence of `token`, leaving the rest of the content
/// untouched.
pub(crate) fn remove_placeholder(content: &str, token: &str) -> String {
    content.replacen(token, "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;

    fn sample_post() -> Post {
        Post {
            id: 5,
            title: "A".to_string(),
            content: "B".to_string(),
            summary: "s".to_string(),
            cover_image: "/files/c.png".to_string(),
            published: false,
            view_count: 0,
            likes: 0,
            created_at: String::new(),
            updated_at: String::new(),
            tags: vec![
                Tag {
                    id: 1,
                    name: "go".to_string(),
                    color: "#3B82F6".to_string(),
                    created_at: String::new(),
                },
                Tag {
                    id: 2,
                    name: "rust".to_string(),
                    color: "#EF4444".to_string(),
                    created_at: String::new(),
                },
            ],
        }
    }

    #[test]
    fn test_from_post_copies_fields_and_tag_names() {
        let draft = PostDraft::from_post(&sample_post());
        assert_eq!(draft.title, "A");
        assert_eq!(draft.content, "B");
        assert_eq!(draft.cover_image, "/files/c.png");
        assert!(!draft.published);
        assert_eq!(draft.tag_names, vec!["go", "rust"]);
    }

    #[test]
    fn test_toggle_tag_twice_is_identity() {
        let mut draft = PostDraft::default();
        let before = draft.tag_names.clone();
        draft.toggle_tag("x");
        assert_eq!(draft.tag_names, vec!["x"]);
        draft.toggle_tag("x");
        assert_eq!(draft.tag_names, before);
    }

    #[test]
    fn test_add_new_tag_name_trims_and_dedupes() {
        let mut draft = PostDraft::default();
        assert!(!draft.add_new_tag_name(""));
        assert!(!draft.add_new_tag_name("   "));
        assert!(draft.add_new_tag_name(" go "));
        assert!(!draft.add_new_tag_name("go"));
        assert_eq!(draft.tag_names, vec!["go"]);
    }

    #[test]
    fn test_payload_overrides_published_without_mutating_draft() {
        let mut draft = PostDraft::from_post(&sample_post());
        draft.published = false;

        let payload = draft.payload(true);
        assert!(payload.published);
        assert!(!draft.published);
        assert_eq!(payload.tag_names, draft.tag_names);
    }

    #[test]
    fn test_is_submittable_requires_title_and_content() {
        let mut draft = PostDraft::default();
        assert!(!draft.is_submittable());
        draft.title = "t".to_string();
        assert!(!draft.is_submittable());
        draft.content = "c".to_string();
        assert!(draft.is_submittable());
    }

    #[test]
    fn test_should_autosave_guards() {
        let mut st = AutosaveState::default();
        // Clean draft: no request.
        assert!(!st.should_autosave(Some(5)));

        st.mark_dirty();
        // Dirty but no post identity: no request.
        assert!(!st.should_autosave(None));
        assert!(st.should_autosave(Some(5)));

        st.begin_autosave();
        // One request in flight at most.
        assert!(!st.should_autosave(Some(5)));
    }

    #[test]
    fn test_finish_autosave_success_clears_dirty() {
        let mut st = AutosaveState::default();
        st.mark_dirty();
        st.begin_autosave();
        st.finish_autosave(true, 1234);
        assert!(!st.autosaving);
        assert!(!st.has_unsaved_changes);
        assert_eq!(st.last_saved_at_ms, Some(1234));
    }

    #[test]
    fn test_finish_autosave_failure_keeps_dirty() {
        let mut st = AutosaveState::default();
        st.mark_dirty();
        st.begin_autosave();
        st.finish_autosave(false, 1234);
        assert!(!st.autosaving);
        assert!(st.has_unsaved_changes);
        assert_eq!(st.last_saved_at_ms, None);
    }

    #[test]
    fn test_superseded_autosave_still_clears_in_flight_flag() {
        let mut st = AutosaveState::default();
        st.mark_dirty();
        st.begin_autosave();
        // The response was dropped in favor of a newer request; the flag must
        // not survive, or the loop would stall permanently.
        st.finish_autosave(false, 99);
        assert!(!st.autosaving);
        assert!(st.has_unsaved_changes);
        assert!(st.should_autosave(Some(1)));
    }

    #[test]
    fn test_placeholder_tokens_are_distinct_per_upload() {
        assert_ne!(placeholder_token(1), placeholder_token(2));
        assert!(placeholder_token(1).contains("上传中"));
    }

    #[test]
    fn test_splice_placeholder_at_cursor() {
        let token = placeholder_token(1);
        let content = splice_placeholder("hello ", 6, &token);
        assert_eq!(content, format!("hello {}", token));
    }

    #[test]
    fn test_splice_placeholder_utf16_cursor_in_cjk_text() {
        // "你好" is 2 UTF-16 units but 6 bytes; cursor 2 sits after it.
        let token = placeholder_token(3);
        let content = splice_placeholder("你好world", 2, &token);
        assert_eq!(content, format!("你好{}world", token));
    }

    #[test]
    fn test_resolve_placeholder_replaces_first_occurrence() {
        let token = placeholder_token(1);
        let content = format!("hello {}", token);
        let resolved =
            resolve_placeholder(&content, &token, "http://localhost:8080/files/x.png").unwrap();
        assert_eq!(resolved, "hello ![图片](http://localhost:8080/files/x.png)");
    }

    #[test]
    fn test_resolve_placeholder_missing_token() {
        assert!(resolve_placeholder("hello", "![上传中...](#uploading-9)", "/x.png").is_none());
    }

    #[test]
    fn test_remove_placeholder_leaves_rest_untouched() {
        let token = placeholder_token(2);
        let content = format!("before {} after", token);
        assert_eq!(remove_placeholder(&content, &token), "before  after");
    }

    #[test]
    fn test_concurrent_pastes_resolve_independently() {
        let t1 = placeholder_token(1);
        let t2 = placeholder_token(2);
        let content = format!("a {} b {} c", t1, t2);

        let content = resolve_placeholder(&content, &t2, "http://h/2.png").unwrap();
        let content = resolve_placeholder(&content, &t1, "http://h/1.png").unwrap();
        assert_eq!(content, "a ![图片](http://h/1.png) b ![图片](http://h/2.png) c");
    }
}
