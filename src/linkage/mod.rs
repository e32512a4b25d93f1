// Linkage index: groups comments under the post they reply to.
//
// Groups borrow documents from the corpus rather than copying them, so a
// group is only ever a view over the loaded data. Linking is a single pass
// over the comments against a hash index of post ids (O(P + C)), and the
// comment pass can be fed in chunks.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::corpus::models::Document;

/// How comments are ordered inside a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentOrder {
    /// Input order (the default)
    #[default]
    Input,
    /// Highest score first; ties keep input order
    ScoreDescending,
}

#[derive(Debug, Clone, Default)]
pub struct LinkageConfig {
    pub comment_order: CommentOrder,
}

/// One post and the comments linked to it.
#[derive(Debug, Clone)]
pub struct ConversationGroup<'a> {
    pub post: &'a Document,
    pub comments: Vec<&'a Document>,
}

impl<'a> ConversationGroup<'a> {
    pub fn post_id(&self) -> &str {
        &self.post.doc_id
    }

    /// The post followed by its comments.
    pub fn documents(&self) -> impl Iterator<Item = &'a Document> + '_ {
        std::iter::once(self.post).chain(self.comments.iter().copied())
    }
}

/// Result of linking a corpus.
#[derive(Debug, Clone)]
pub struct Linkage<'a> {
    pub groups: Vec<ConversationGroup<'a>>,
    /// Comments whose parent is missing or unknown, in input order
    pub orphans: Vec<&'a Document>,
}

/// Summary counts for reporting how much of the corpus linked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkageCoverage {
    pub groups: usize,
    pub groups_with_comments: usize,
    pub groups_without_comments: usize,
    pub linked_comments: usize,
    pub orphan_comments: usize,
}

impl<'a> Linkage<'a> {
    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    pub fn linked_comment_count(&self) -> usize {
        self.groups.iter().map(|g| g.comments.len()).sum()
    }

    pub fn coverage(&self) -> LinkageCoverage {
        let with_comments = self
            .groups
            .iter()
            .filter(|g| !g.comments.is_empty())
            .count();
        LinkageCoverage {
            groups: self.groups.len(),
            groups_with_comments: with_comments,
            groups_without_comments: self.groups.len() - with_comments,
            linked_comments: self.linked_comment_count(),
            orphan_comments: self.orphan_count(),
        }
    }
}

/// Incremental linker. Build it from the posts, feed it comments in one or
/// more chunks, then `finish`.
#[derive(Debug)]
pub struct LinkageIndex<'a> {
    groups: Vec<ConversationGroup<'a>>,
    by_post_id: HashMap<&'a str, usize>,
    orphans: Vec<&'a Document>,
}

impl<'a> LinkageIndex<'a> {
    /// Index posts by id. Non-post documents are ignored. When two posts share
    /// an id both get a group, but comments attach to the first one.
    pub fn new<I>(posts: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut groups = Vec::new();
        let mut by_post_id = HashMap::new();

        for post in posts.into_iter().filter(|d| d.is_post()) {
            by_post_id.entry(post.doc_id.as_str()).or_insert(groups.len());
            groups.push(ConversationGroup {
                post,
                comments: Vec::new(),
            });
        }

        Self {
            groups,
            by_post_id,
            orphans: Vec::new(),
        }
    }

    /// Link a chunk of comments. Non-comment documents are ignored.
    pub fn link<I>(&mut self, comments: I)
    where
        I: IntoIterator<Item = &'a Document>,
    {
        for comment in comments.into_iter().filter(|d| d.is_comment()) {
            let slot = comment
                .parent_id
                .as_deref()
                .and_then(|parent| self.by_post_id.get(parent).copied());

            match slot {
                Some(i) => self.groups[i].comments.push(comment),
                None => {
                    debug!(
                        doc_id = %comment.doc_id,
                        parent_id = comment.parent_id.as_deref().unwrap_or("<none>"),
                        "Orphaned comment"
                    );
                    self.orphans.push(comment);
                }
            }
        }
    }

    pub fn finish(mut self, config: &LinkageConfig) -> Linkage<'a> {
        if config.comment_order == CommentOrder::ScoreDescending {
            for group in &mut self.groups {
                group
                    .comments
                    .sort_by_key(|c| Reverse(c.score_or_default()));
            }
        }

        Linkage {
            groups: self.groups,
            orphans: self.orphans,
        }
    }
}

/// Link every comment in `documents` to its post.
pub fn build_groups<'a>(documents: &'a [Document], config: &LinkageConfig) -> Linkage<'a> {
    let mut index = LinkageIndex::new(documents);
    index.link(documents);
    let linkage = index.finish(config);

    info!(
        groups = linkage.groups.len(),
        linked_comments = linkage.linked_comment_count(),
        orphans = linkage.orphan_count(),
        "Built conversation groups"
    );

    linkage
}
