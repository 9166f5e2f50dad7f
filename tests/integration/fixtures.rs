//! HTML builders mimicking the catalog's page layout

/// A card on an index page: (href, label, shows a price)
pub type Card<'a> = (&'a str, &'a str, bool);

fn pager(pages: u32) -> String {
    if pages <= 1 {
        return String::new();
    }
    let links: String = (1..=pages)
        .map(|n| format!(r#"<a class="pager__link" href="?p={n}">{n}</a>"#))
        .collect();
    format!(r#"<div class="pager">{links}</div>"#)
}

fn cards(cards: &[Card<'_>], product: bool) -> String {
    let itemtype = if product {
        r#" itemtype="http://schema.org/Product""#
    } else {
        ""
    };
    cards
        .iter()
        .map(|(href, label, priced)| {
            let price = if *priced {
                r#"<div class="cat-card__price">1 990 <span>руб.</span></div>"#
            } else {
                ""
            };
            format!(
                r#"<div class="cat-card"{itemtype}>
                     <a class="cat-card__title-link" href="{href}">  {label}  </a>{price}
                   </div>"#
            )
        })
        .collect()
}

pub fn brand_page(path: &str, name: &str, collections: &[Card<'_>], pages: u32) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>{name} — catalog</title></head><body>
        <nav class="top-vendors">
          <a href="/brands/other/">Other</a>
          <a href="{path}">{name}</a>
        </nav>
        <h1>Tiles by {name}</h1>
        <div class="vendor-desc__image"><img src="/upload/{name}.png"></div>
        <dl class="vendor-desc__params">
          <dt>Страна</dt><dd><a href="/country/it/">Италия</a></dd>
          <dt>Официальный сайт</dt><dd><a href="https://{name}.example">{name}.example</a></dd>
        </dl>
        <div class="article-text"><p>{name} makes porcelain stoneware.</p></div>
        <div class="cat-list">{}</div>
        {}
        </body></html>"#,
        cards(collections, false),
        pager(pages)
    )
}

pub fn collection_index(collections: &[Card<'_>]) -> String {
    format!(
        r#"<html><body><div class="cat-list">{}</div></body></html>"#,
        cards(collections, false)
    )
}

pub fn collection_page(name: &str, products: &[Card<'_>], pages: u32) -> String {
    format!(
        r#"<html><body>
        <div class="article-text"><p>{name} collection</p></div>
        <dl class="cat-article-params">
          <dt>Format</dt><dd>60x60</dd>
          <dt>Surface</dt><dd>Matte</dd>
        </dl>
        <ul class="gallery__thumbs">
          <li data-full="/upload/{name}-1.jpg"></li>
          <li data-full="/upload/{name}-2.jpg"></li>
        </ul>
        <div class="cat-list">{}</div>
        {}
        </body></html>"#,
        cards(products, true),
        pager(pages)
    )
}

pub fn product_page(name: &str, price: &str) -> String {
    format!(
        r#"<html><body>
        <div class="static-text"><p>{name} tile</p></div>
        <dl class="cat-article-params"><dt>Thickness</dt><dd>10 mm</dd></dl>
        <div class="cat-price"><span class="cat-price__cur">{price}</span><span class="cat-price__measure">м²</span></div>
        <div class="cat-article-desc__image"><img src="/upload/{name}.jpg"></div>
        </body></html>"#
    )
}
