use actix_web::{HttpResponse, web};
use serde::Serialize;
use tera::Context;

use scribe_core::forms::SearchForm;

use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{FormView, PostView, render_html};

#[derive(Serialize)]
struct SearchResultView {
    post: PostView,
    similarity: f64,
}

/// GET /search/?query=...
///
/// Without a `query` parameter only the empty form is shown. A blank query
/// is a form error and never reaches storage.
pub async fn post_search(
    state: web::Data<AppState>,
    form: web::Query<SearchForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let mut context = Context::new();
    context.insert("query", &form.query.as_deref().map(str::trim));

    if !form.is_bound() {
        context.insert("searched", &false);
        context.insert("form", &FormView::unbound(form));
        context.insert("results", &Vec::<SearchResultView>::new());
        return render_html(&state.views, "blog/post/search.html", &context);
    }

    let results: Vec<SearchResultView> = match form.validate() {
        Ok(query) => {
            let hits = state.posts.search(&query, state.site.search_order).await?;
            tracing::debug!(query = %query, hits = hits.len(), "Search");
            context.insert("searched", &true);
            context.insert("form", &FormView::unbound(form));
            hits.iter()
                .map(|hit| SearchResultView {
                    post: PostView::from(&hit.post),
                    similarity: hit.similarity,
                })
                .collect()
        }
        Err(errors) => {
            context.insert("searched", &false);
            context.insert("form", &FormView::with_errors(form, errors));
            Vec::new()
        }
    };

    context.insert("results", &results);
    render_html(&state.views, "blog/post/search.html", &context)
}
