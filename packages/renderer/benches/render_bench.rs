use blockwork_expression::Args;
use blockwork_model::{BlockNode, Document};
use blockwork_renderer::{to_html, Renderer};
use blockwork_schema::SchemaRegistry;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

fn catalog_page() -> Document {
    let card = BlockNode::new("Container", "card")
        .with_child(
            "children",
            BlockNode::new("Heading", "title")
                .with_prop("level", 3)
                .with_prop("content", "{{ product.name }}"),
        )
        .with_child(
            "children",
            BlockNode::new("Text", "price").with_prop("content", "{{ product.price }} EUR"),
        )
        .with_child(
            "children",
            BlockNode::new("ConditionalContainer", "sale")
                .with_prop("condition", "product.price < 20")
                .with_child("children", BlockNode::new("InlineText", "badge").with_prop("content", "Sale")),
        );

    Document::from(
        BlockNode::new("PageLayout", "root").with_child(
            "children",
            BlockNode::new("ForeachContainer", "products")
                .with_prop("value", "products")
                .with_prop("itemName", "product")
                .with_child("children", card),
        ),
    )
}

fn bench_render(c: &mut Criterion) {
    let registry = SchemaRegistry::builtin();
    let doc = catalog_page();
    let products: Vec<_> = (0..200)
        .map(|i| json!({ "name": format!("Item {}", i), "price": i % 40 }))
        .collect();
    let args = Args::from_value(json!({ "products": products }));
    let renderer = Renderer::new(&registry);

    c.bench_function("render_catalog_200", |b| {
        b.iter(|| renderer.render_document(black_box(&doc), black_box(&args)))
    });

    c.bench_function("render_catalog_200_html", |b| {
        b.iter(|| {
            let page = renderer.render_document(&doc, &args).into_page();
            page.map(|p| to_html(&p))
        })
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
