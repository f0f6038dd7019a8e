//! Example: Paged listing over an in-memory repository
//!
//! Registers a `Book` entity, seeds a memory repository, and pages through it
//! with string filters and sort fields the way an HTTP handler would after
//! reading them from a query string. Every save and delete is logged as a
//! JSON entity event.
//!
//! Run with: cargo run --example paged-listing

use std::sync::Arc;

use crud_scaffold::prelude::*;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
struct Book {
    id: i64,
    title: String,
    author: String,
    year: i64,
    in_print: bool,
}

impl Book {
    const REVIEWS: Relation<Book> = Relation::new("reviews");

    fn new(title: &str, author: &str, year: i64) -> Self {
        Self {
            id: 0,
            title: title.to_string(),
            author: author.to_string(),
            year,
            in_print: true,
        }
    }
}

static BOOK_SCHEMA: Lazy<EntitySchema<Book>> = Lazy::new(|| {
    EntitySchema::<Book>::new("Book")
        .field("id", FieldKind::Integer, |b| b.id.into())
        .field("title", FieldKind::Text, |b| FieldValue::from(&b.title))
        .field("author", FieldKind::Text, |b| FieldValue::from(&b.author))
        .field("year", FieldKind::Integer, |b| b.year.into())
        .field("in_print", FieldKind::Boolean, |b| b.in_print.into())
});

impl Entity for Book {
    fn schema() -> &'static EntitySchema<Self> {
        &BOOK_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

fn print_page(label: &str, page: &Page<Book>) {
    println!(
        "{label}: page {}/{} ({} total)",
        page.page,
        page.total_pages(),
        page.total
    );
    for book in &page.items {
        println!("  #{:<2} {:<28} {:<20} {}", book.id, book.title, book.author, book.year);
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    init_tracing(&config)?;

    let repository = Arc::new(MemoryRepository::<Book>::new());
    let service = CrudService::new(repository, config.query.clone())
        .with_event_storage(Arc::new(LoggingEventStorage));

    let audit = AuditInfo::new("librarian@example.com", "Librarian");
    for (title, author, year) in [
        ("The Rust Programming Language", "Klabnik", 2018),
        ("Programming Rust", "Blandy", 2017),
        ("Rust for Rustaceans", "Gjengset", 2021),
        ("Zero To Production", "Palmieri", 2022),
        ("Rust in Action", "McNamara", 2021),
        ("Hands-on Rust", "Wolverson", 2021),
    ] {
        service.save(Book::new(title, author, year), true, &audit).await?;
    }

    // ?filter=title_Rust&order_by=year&descending=true&page_size=4
    let page = service
        .get_page(
            PageQuery::new()
                .with_filter("title_Rust")
                .with_order_by("year")
                .descending()
                .with_page_size(4),
        )
        .await?;
    print_page("Rust titles, newest first", &page);

    let page = service
        .get_page(PageQuery::new().with_page(2).with_page_size(4).with_order_by("title"))
        .await?;
    print_page("All titles, second page", &page);

    // A specification can also be built by hand for the repository
    let clauses = parse_filter("year_2021", Op::GreaterThanOrEqual)?;
    let mut spec = Specification::multi_ordered(
        build_predicate::<Book>(&clauses)?,
        vec![SortSelector::for_field("year")?, SortSelector::for_field("title")?],
        false,
        None,
        None,
        None,
    );
    spec.add_include(Book::REVIEWS);
    let recent = service.repository().find_by_spec(&spec).await?;
    println!("Published 2021 or later: {}", recent.len());

    // Errors in client input surface as bad requests
    if let Err(err) = service
        .get_page(PageQuery::new().with_filter("in_print_true"))
        .await
    {
        println!("Rejected filter: {} ({})", err.message, err.kind.error_code());
    }

    service.delete(2).await?;
    println!("Remaining books: {}", service.repository().len());

    Ok(())
}
