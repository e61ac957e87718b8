use eframe::egui;
use iw_css::ComputedStyle;
use iw_css::Display;
use iw_css::Rgba;
use iw_css::Stroke;
use iw_css::StyleResolver;
use iw_css::TextAlign;
use iw_css::document_css;
use iw_dom::Document;
use iw_dom::NodeData;
use iw_dom::NodeHandle;
use iw_editor::Editor;

const HEADING: &str = "Visualização e Edição";
const TIP: &str = "Dica: clique em um elemento para bloquear a seleção e editar com segurança.";
const PAGE_BACKGROUND: egui::Color32 = egui::Color32::WHITE;
/// Boxes nested deeper than this paint their subtree as one text run.
pub(crate) const MAX_PAINT_DEPTH: usize = 48;

/// Elements that never produce boxes.
const NON_RENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "title", "meta", "link", "template", "noscript",
];

/// Screen-space box of one rendered element, in paint order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ElementBox {
    pub node: NodeHandle,
    pub rect: egui::Rect,
    /// Distance from `<body>`; deeper boxes win hit-tests.
    pub depth: usize,
    pub outline: Option<Stroke>,
    pub outline_offset: f32,
    pub pointer_cursor: bool,
}

/// Central panel: paints the live document and turns pointer input into
/// editor events.
#[derive(Debug, Default)]
pub(crate) struct PreviewPane {
    style_source: String,
    resolver: StyleResolver,
    hovered: Option<NodeHandle>,
}

impl PreviewPane {
    /// Forgets the hovered element; handles from a replaced document are
    /// stale.
    pub fn reset(&mut self) {
        self.hovered = None;
    }

    /// Renders the preview. Returns a status line when a click changed the
    /// selection.
    pub fn show(&mut self, ui: &mut egui::Ui, editor: &mut Editor) -> Option<String> {
        ui.heading(HEADING);
        ui.label(egui::RichText::new(TIP).weak());
        ui.separator();

        let Some(doc) = editor.document() else {
            ui.label("Nenhum documento carregado.");
            return None;
        };
        self.refresh_styles(doc);

        let resolver = &self.resolver;
        let output = egui::Frame::NONE
            .fill(PAGE_BACKGROUND)
            .show(ui, |ui| {
                egui::ScrollArea::both()
                    .id_salt("preview_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.style_mut().interaction.selectable_labels = false;
                        ui.spacing_mut().item_spacing = egui::vec2(0.0, 0.0);
                        let boxes = render_document(ui, doc, resolver);
                        paint_outlines(ui.painter(), &boxes);
                        boxes
                    })
            })
            .inner;

        let viewport = output.inner_rect;
        let boxes = output.inner;
        let hit = ui
            .ctx()
            .pointer_hover_pos()
            .filter(|pos| viewport.contains(*pos))
            .and_then(|pos| hit_test(&boxes, pos));

        if hit.is_some_and(|element| element.pointer_cursor) {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let hovered = hit.map(|element| element.node);
        if hovered != self.hovered {
            self.hovered = hovered;
            if let Some(node) = hovered {
                editor.pointer_over(node);
            }
        }

        let clicked = ui.input(|input| input.pointer.primary_clicked());
        match hovered {
            Some(node) if clicked => {
                editor.click(node);
                editor
                    .is_locked()
                    .then(|| format!("Elemento bloqueado: {}", editor.path_descriptor()))
            }
            _ => None,
        }
    }

    fn refresh_styles(&mut self, doc: &Document) {
        let source = document_css(doc);
        if source != self.style_source {
            self.resolver = StyleResolver::from_css(&source);
            self.style_source = source;
        }
    }
}

/// Innermost box under `pos`; among equally deep boxes the one painted
/// last wins.
pub(crate) fn hit_test(boxes: &[ElementBox], pos: egui::Pos2) -> Option<&ElementBox> {
    boxes
        .iter()
        .filter(|element| element.rect.contains(pos))
        .max_by_key(|element| element.depth)
}

pub(crate) fn to_color32(color: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

struct RenderCtx<'a> {
    doc: &'a Document,
    resolver: &'a StyleResolver,
    boxes: Vec<ElementBox>,
}

impl RenderCtx<'_> {
    fn record(&mut self, node: NodeHandle, rect: egui::Rect, style: &ComputedStyle, depth: usize) {
        self.boxes.push(ElementBox {
            node,
            rect,
            depth,
            outline: style.outline,
            outline_offset: style.outline_offset,
            pointer_cursor: style.pointer_cursor,
        });
    }

    fn style_of(&self, node: NodeHandle, parent: &ComputedStyle) -> Option<ComputedStyle> {
        let tag = self.doc.tag_name(node)?;
        if NON_RENDERED_TAGS.contains(&tag) {
            return None;
        }
        let style = self.resolver.compute(self.doc, node, Some(parent));
        (style.display != Display::None).then_some(style)
    }
}

enum InlineItem {
    Text(String),
    Element(NodeHandle, ComputedStyle),
}

pub(crate) fn render_document(ui: &mut egui::Ui, doc: &Document, resolver: &StyleResolver) -> Vec<ElementBox> {
    let mut ctx = RenderCtx {
        doc,
        resolver,
        boxes: Vec::new(),
    };
    let Some(html) = doc.document_element() else {
        return ctx.boxes;
    };
    let root_style = resolver.compute(doc, html, None);

    match doc.body() {
        Some(body) => {
            if let Some(style) = ctx.style_of(body, &root_style) {
                render_block(ui, &mut ctx, body, &style, 0);
            }
        }
        None => render_children(ui, &mut ctx, html, &root_style, 0),
    }
    ctx.boxes
}

fn render_block(
    ui: &mut egui::Ui,
    ctx: &mut RenderCtx<'_>,
    node: NodeHandle,
    style: &ComputedStyle,
    depth: usize,
) {
    let margin = style.margin;
    ui.add_space(margin.top.max(0.0));

    let rect = ui
        .horizontal_top(|ui| {
            ui.add_space(margin.left.max(0.0));
            let width = (ui.available_width() - margin.right.max(0.0)).max(1.0);
            let rect = ui
                .vertical(|ui| {
                    ui.set_width(width);
                    if ctx.doc.tag_name(node) == Some("hr") {
                        return ui.separator().rect;
                    }
                    styled_box(ui, style, true, |ui| render_flow(ui, ctx, node, style, depth))
                })
                .inner;
            ui.add_space(margin.right.max(0.0));
            rect
        })
        .inner;

    ui.add_space(margin.bottom.max(0.0));
    ctx.record(node, rect, style, depth);
}

fn render_flow(
    ui: &mut egui::Ui,
    ctx: &mut RenderCtx<'_>,
    node: NodeHandle,
    style: &ComputedStyle,
    depth: usize,
) {
    if depth >= MAX_PAINT_DEPTH {
        render_flattened(ui, ctx, node, style);
        return;
    }

    match style.display {
        Display::ListItem => {
            let marker = list_marker(ctx.doc, node);
            ui.horizontal_top(|ui| {
                ui.label(rich_text(&format!("{marker} "), style));
                ui.vertical(|ui| render_children(ui, ctx, node, style, depth));
            });
        }
        Display::Flex => {
            ui.horizontal_wrapped(|ui| {
                for child in ctx.doc.children(node).collect::<Vec<_>>() {
                    let item = match ctx.doc.data(child) {
                        Some(NodeData::Text(text)) => InlineItem::Text(collapse_whitespace(text)),
                        Some(NodeData::Element(_)) => match ctx.style_of(child, style) {
                            Some(child_style) => InlineItem::Element(child, child_style),
                            None => continue,
                        },
                        _ => continue,
                    };
                    render_inline(ui, ctx, item, style, depth + 1, true);
                }
            });
        }
        _ => render_children(ui, ctx, node, style, depth),
    }
}

/// Lays out children, grouping consecutive inline-level nodes into wrapped
/// rows between block boxes.
fn render_children(
    ui: &mut egui::Ui,
    ctx: &mut RenderCtx<'_>,
    node: NodeHandle,
    style: &ComputedStyle,
    depth: usize,
) {
    let mut run: Vec<InlineItem> = Vec::new();
    for child in ctx.doc.children(node).collect::<Vec<_>>() {
        match ctx.doc.data(child) {
            Some(NodeData::Text(text)) => run.push(InlineItem::Text(collapse_whitespace(text))),
            Some(NodeData::Element(_)) => {
                let Some(child_style) = ctx.style_of(child, style) else {
                    continue;
                };
                if child_style.display.is_inline() || ctx.doc.tag_name(child) == Some("br") {
                    run.push(InlineItem::Element(child, child_style));
                } else {
                    flush_run(ui, ctx, &mut run, style, depth + 1);
                    render_block(ui, ctx, child, &child_style, depth + 1);
                }
            }
            _ => {}
        }
    }
    flush_run(ui, ctx, &mut run, style, depth + 1);
}

fn flush_run(
    ui: &mut egui::Ui,
    ctx: &mut RenderCtx<'_>,
    run: &mut Vec<InlineItem>,
    style: &ComputedStyle,
    depth: usize,
) {
    let is_blank = |item: &InlineItem| matches!(item, InlineItem::Text(text) if text.trim().is_empty());
    while run.last().is_some_and(is_blank) {
        run.pop();
    }
    let start = run.iter().take_while(|&item| is_blank(item)).count();
    if start == run.len() {
        run.clear();
        return;
    }

    let items: Vec<InlineItem> = run.drain(..).skip(start).collect();
    let add_items = |ui: &mut egui::Ui| {
        for item in items {
            render_inline(ui, ctx, item, style, depth, false);
        }
    };
    if style.text_align == TextAlign::Right {
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            ui.horizontal_wrapped(|ui| add_items(ui));
        });
    } else {
        ui.horizontal_wrapped(|ui| add_items(ui));
    }
}

/// Renders one inline-level item into the current row. `as_box` lays out
/// flex items as shrink-wrapped boxes whatever their display.
fn render_inline(
    ui: &mut egui::Ui,
    ctx: &mut RenderCtx<'_>,
    item: InlineItem,
    parent: &ComputedStyle,
    depth: usize,
    as_box: bool,
) -> Option<egui::Rect> {
    let (node, style) = match item {
        InlineItem::Text(text) => {
            if text.is_empty() {
                return None;
            }
            return Some(ui.label(rich_text(&text, parent)).rect);
        }
        InlineItem::Element(node, style) => (node, style),
    };

    let rect = match ctx.doc.tag_name(node) {
        Some("br") => {
            ui.end_row();
            return None;
        }
        Some("img") => {
            let alt = ctx.doc.get_attribute(node, "alt").unwrap_or("imagem");
            Some(ui.label(rich_text(&format!("[{alt}]"), &style)).rect)
        }
        _ if as_box || style.display == Display::InlineBlock => {
            ui.add_space(style.margin.left.max(0.0));
            let rect = styled_box(ui, &style, false, |ui| {
                ui.horizontal_wrapped(|ui| render_inline_children(ui, ctx, node, &style, depth));
            });
            ui.add_space(style.margin.right.max(0.0));
            Some(rect)
        }
        _ => render_inline_children(ui, ctx, node, &style, depth),
    };

    if let Some(rect) = rect {
        ctx.record(node, rect, &style, depth);
    }
    rect
}

fn render_inline_children(
    ui: &mut egui::Ui,
    ctx: &mut RenderCtx<'_>,
    node: NodeHandle,
    style: &ComputedStyle,
    depth: usize,
) -> Option<egui::Rect> {
    if depth >= MAX_PAINT_DEPTH {
        return Some(render_flattened(ui, ctx, node, style));
    }

    let mut bounds: Option<egui::Rect> = None;
    for child in ctx.doc.children(node).collect::<Vec<_>>() {
        let item = match ctx.doc.data(child) {
            Some(NodeData::Text(text)) => InlineItem::Text(collapse_whitespace(text)),
            Some(NodeData::Element(_)) => match ctx.style_of(child, style) {
                Some(child_style) => InlineItem::Element(child, child_style),
                None => continue,
            },
            _ => continue,
        };
        if let Some(rect) = render_inline(ui, ctx, item, style, depth + 1, false) {
            bounds = Some(bounds.map_or(rect, |current| current.union(rect)));
        }
    }
    bounds
}

fn render_flattened(
    ui: &mut egui::Ui,
    ctx: &RenderCtx<'_>,
    node: NodeHandle,
    style: &ComputedStyle,
) -> egui::Rect {
    let text = collapse_whitespace(&ctx.doc.text_content(node));
    ui.label(rich_text(text.trim(), style)).rect
}

/// Background, border and padding around `body`. Returns the border box.
fn styled_box(
    ui: &mut egui::Ui,
    style: &ComputedStyle,
    fill_width: bool,
    body: impl FnOnce(&mut egui::Ui),
) -> egui::Rect {
    let border = style.border.map_or(0.0, |border| border.width.max(0.0));
    let padding = style.padding;
    let mut frame = egui::Frame::NONE
        .corner_radius(egui::CornerRadius::same(style.corner_radius.clamp(0.0, 255.0) as u8));
    if let Some(background) = style.background {
        frame = frame.fill(to_color32(background));
    }

    let response = frame.show(ui, |ui| {
        if fill_width {
            ui.set_min_width(ui.available_width());
        }
        ui.add_space(padding.top.max(0.0) + border);
        ui.horizontal_top(|ui| {
            ui.add_space(padding.left.max(0.0) + border);
            ui.vertical(|ui| {
                if fill_width {
                    ui.set_width((ui.available_width() - padding.right.max(0.0) - border).max(1.0));
                }
                body(ui);
            });
            ui.add_space(padding.right.max(0.0) + border);
        });
        ui.add_space(padding.bottom.max(0.0) + border);
    });

    let rect = response.response.rect;
    if let Some(stroke) = style.border {
        paint_ring(ui.painter(), rect, stroke.width, to_color32(stroke.color));
    }
    rect
}

fn paint_outlines(painter: &egui::Painter, boxes: &[ElementBox]) {
    for element in boxes {
        let Some(outline) = element.outline else {
            continue;
        };
        let outer = element.rect.expand(element.outline_offset + outline.width);
        paint_ring(painter, outer, outline.width, to_color32(outline.color));
    }
}

/// Paints a `width`-thick frame just inside `rect`.
fn paint_ring(painter: &egui::Painter, rect: egui::Rect, width: f32, color: egui::Color32) {
    if rect.width() <= 0.0 || rect.height() <= 0.0 || width <= 0.0 {
        return;
    }
    let width = width.min(rect.width() / 2.0).min(rect.height() / 2.0);

    let top = egui::Rect::from_min_max(rect.min, egui::pos2(rect.max.x, rect.min.y + width));
    let bottom = egui::Rect::from_min_max(egui::pos2(rect.min.x, rect.max.y - width), rect.max);
    let left = egui::Rect::from_min_max(
        egui::pos2(rect.min.x, rect.min.y + width),
        egui::pos2(rect.min.x + width, rect.max.y - width),
    );
    let right = egui::Rect::from_min_max(
        egui::pos2(rect.max.x - width, rect.min.y + width),
        egui::pos2(rect.max.x, rect.max.y - width),
    );
    for side in [top, bottom, left, right] {
        painter.rect_filled(side, 0.0, color);
    }
}

fn rich_text(text: &str, style: &ComputedStyle) -> egui::RichText {
    let mut rich = egui::RichText::new(text)
        .size(style.font_size.max(1.0))
        .color(to_color32(style.color));
    if style.bold {
        rich = rich.strong();
    }
    if style.italic {
        rich = rich.italics();
    }
    if style.underline {
        rich = rich.underline();
    }
    if style.monospace {
        rich = rich.monospace();
    }
    rich
}

fn list_marker(doc: &Document, item: NodeHandle) -> String {
    let ordered = doc
        .parent_element(item)
        .and_then(|parent| doc.tag_name(parent))
        .is_some_and(|tag| tag == "ol");
    if ordered {
        let position = doc.nth_of_type(item).unwrap_or(1);
        format!("{position}.")
    } else {
        "•".to_owned()
    }
}
