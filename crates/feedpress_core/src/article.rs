use chrono::{DateTime, Utc};

use crate::{
    interleave_images, slugify, ArticleStatus, FeedEntry, FeedSource, PublishableArticle,
    RawArticle, RewrittenArticle,
};

/// Everything besides the rewrite itself that goes into a finished article.
#[derive(Debug, Clone)]
pub struct ArticleContext<'a> {
    pub source: &'a FeedSource,
    pub entry: &'a FeedEntry,
    pub raw: &'a RawArticle,
    pub status: ArticleStatus,
    pub author: &'a str,
    pub slug_max_len: usize,
    pub now: DateTime<Utc>,
}

/// Interleaves the source images into the rewritten body and derives the slug
/// from the rewritten title.
pub fn assemble_article(rewritten: RewrittenArticle, ctx: &ArticleContext<'_>) -> PublishableArticle {
    let content = interleave_images(&rewritten.content, &ctx.raw.images);
    let slug = slugify(&rewritten.title, ctx.slug_max_len);

    PublishableArticle {
        slug,
        title: rewritten.title,
        excerpt: rewritten.excerpt,
        content,
        category: ctx.source.category.clone(),
        tags: rewritten.tags,
        thumbnail: ctx.raw.thumbnail().to_string(),
        source_url: ctx.entry.link.clone(),
        source_name: ctx.source.name.clone(),
        author: ctx.author.to_string(),
        status: ctx.status,
        created_at: ctx.now,
        updated_at: ctx.now,
        published_at: ctx.now,
        views: 0,
    }
}
