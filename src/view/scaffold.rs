use crate::{
    PipeModel, Result,
    dom::{Document, Element, ElementId},
};

use super::{
    classifier::{PipeKind, ScaffoldStyle},
    icon::{IconRenderer, TYPE_WINDOW_CLASS},
};

pub fn window_dom_id(window_id: u64) -> String {
    format!("sourceWindow{}", window_id)
}

/// Build the detached scaffold of a pipe and return its root.
///
/// ```text
/// div.window.sourceWindow#sourceWindow{id}
///   div.typeWindow        generic pipes only
///     img.typeImage       when the type has an icon
///     strong              type text, plain style
///   div.bottomContainer
///     strong              name
///     hr                  plain style, non-exit
///     strong              extra
/// ```
pub(crate) fn build(
    document: &Document,
    window_id: u64,
    model: &PipeModel,
    kind: PipeKind,
    style: ScaffoldStyle,
    icons: &IconRenderer,
) -> Result<ElementId> {
    let root = document.create(Element::div().with_class("window").with_class("sourceWindow").with_id(window_dom_id(window_id)));

    if let Err(e) = fill(document, root, model, kind, style, icons) {
        let _ = document.remove(root);
        return Err(e);
    }
    Ok(root)
}

fn fill(
    document: &Document,
    root: ElementId,
    model: &PipeModel,
    kind: PipeKind,
    style: ScaffoldStyle,
    icons: &IconRenderer,
) -> Result<()> {
    if kind == PipeKind::Activity {
        let type_window = document.create_in(root, Element::div().with_class(TYPE_WINDOW_CLASS))?;
        if let Some(icon) = icons.type_icon(model.pipe_type.as_deref()) {
            document.create_in(type_window, icon)?;
        }
        if style.type_text {
            document.create_in(type_window, Element::new("strong").with_text(model.pipe_type.clone().unwrap_or_default()))?;
        }
    }

    let bottom = document.create_in(root, Element::div().with_class("bottomContainer"))?;
    document.create_in(bottom, Element::new("strong").with_text(model.name.as_str()))?;
    if style.rule && kind != PipeKind::Exit {
        document.create_in(bottom, Element::new("hr"))?;
    }
    document.create_in(bottom, Element::new("strong").with_text(model.extra.as_str()))?;

    if style.boxed || kind == PipeKind::Exit {
        document.update(root, |el| {
            if style.boxed {
                el.style.insert("width".to_string(), "auto".to_string());
                el.style.insert("height".to_string(), "auto".to_string());
            }
            el.style.insert("border".to_string(), "1px solid black".to_string());
        })?;
    }
    Ok(())
}
