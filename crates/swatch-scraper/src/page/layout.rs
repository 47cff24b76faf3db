//! Selectors and in-page scripts for the supported product page layout.
//!
//! Scripts return plain JSON so results deserialize straight into
//! `swatch_core` types. Missing elements produce empty values, never errors.

pub(super) const MODAL_CLOSE: &str = ".Modal__close";

pub(super) const VIDEO: &str = ".VideoPlayer video";

pub(super) const SWATCH_LABELS_JS: &str = r"
return Array.from(document.querySelectorAll('.ColorSwatchButton'))
  .map(button => button.getAttribute('aria-label') || '');
";

/// Yields a `RawVariant`.
pub(super) const CURRENT_VARIANT_JS: &str = r"
const gallery = document.querySelector('.PdpCarouselWrapper__hero-gallery--thumbnails');
const images = gallery
  ? Array.from(gallery.querySelectorAll('.Carousel img')).map(img => img.getAttribute('data-src') || '')
  : [];
const nameEl = document.querySelector('.Overview__name');
const label = nameEl && nameEl.previousSibling ? nameEl.previousSibling.textContent || '' : '';
const swatchEl = document.querySelector('.ColorSwatchButton--active > .ColorSwatch');
let swatch = '';
if (swatchEl) {
  const style = window.getComputedStyle(swatchEl);
  swatch = style.backgroundImage && style.backgroundImage !== 'none'
    ? style.backgroundImage
    : style.backgroundColor;
}
return {
  images,
  colorName: nameEl ? nameEl.textContent || '' : '',
  swatch,
  colorType: label.substring(0, 7),
};
";

/// Yields a `ProductPage`.
pub(super) const PRODUCT_JS: &str = r"
const text = selector => {
  const el = document.querySelector(selector);
  return el ? (el.textContent || '').trim() : null;
};
return {
  title: text('h1'),
  price: text('.Price'),
  sizes: Array.from(document.querySelectorAll('.SizeSelector__button'))
    .map(button => (button.textContent || '').trim()),
  bigImages: Array.from(document.querySelectorAll('.BigSection img'))
    .map(img => img.getAttribute('data-src') || img.getAttribute('src') || ''),
  material: text('.Overview__material'),
  bestFor: text('.Overview__best-for'),
};
";

pub(super) const VIDEO_SRC_JS: &str = r"
const video = document.querySelector('.VideoPlayer video');
if (!video) return null;
const source = video.querySelector('source');
return video.getAttribute('src') || (source && source.getAttribute('src')) || video.currentSrc || null;
";
