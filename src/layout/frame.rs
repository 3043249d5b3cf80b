use super::*;

impl Layouter<'_> {
    /// Frames and interfaces: labelled structures stacked top to bottom, then one band per
    /// relation below the whole stack, whatever the source order.
    pub(super) fn layout_components(&mut self, root: ElementId) -> (f32, f32) {
        let cfg = &self.config.frame;
        let (top, block_gap, band) = (cfg.top_padding, cfg.block_gap, cfg.relation_band);

        let components = self.scene.children(root).to_vec();
        let mut y = top;
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for component in &components {
            match self.scene.kind(*component) {
                ElementKind::Value => {
                    let (w, h) = self.layout_value(*component);
                    self.geometry.place(*component, 0.0, y);
                    width = width.max(w);
                    height = height.max(y + h);
                    y += h + block_gap;
                }
                ElementKind::Relation => {}
                other => debug!(kind = other.as_str(), "skipping frame component"),
            }
        }

        let relations = components
            .iter()
            .copied()
            .filter(|id| self.scene.kind(*id) == ElementKind::Relation)
            .collect::<Vec<_>>();
        for (idx, relation) in relations.into_iter().enumerate() {
            let (w, h) = self.layout_relation(relation);
            let rel_y = y + idx as f32 * band;
            self.geometry.place(relation, 0.0, rel_y);
            width = width.max(w);
            height = height.max(rel_y + h);
        }
        self.geometry.set_size(root, width, height);
        (width, height)
    }

    /// `name ( arg , arg )` on one line, tokens vertically centred.
    fn layout_relation(&mut self, relation: ElementId) -> (f32, f32) {
        let gap = self.config.frame.token_gap;
        let (pad_x, pad_y) = (self.config.fs.label_pad_x, self.config.fs.label_pad_y);
        self.layout_token_row(relation, gap, pad_x, pad_y)
    }

    /// Places the children of `row` left to right with `gap` between them.
    pub(super) fn layout_token_row(
        &mut self,
        row: ElementId,
        gap: f32,
        label_pad_x: f32,
        label_pad_y: f32,
    ) -> (f32, f32) {
        let tokens = self.scene.children(row).to_vec();
        let mut sizes = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let size = match self.scene.kind(*token) {
                ElementKind::Label => self.layout_label(*token, label_pad_x, label_pad_y),
                _ => self.layout_text(*token),
            };
            sizes.push(size);
        }
        let height = sizes.iter().map(|(_, h)| *h).fold(0.0_f32, f32::max);
        let mut x = 0.0;
        for (token, (w, h)) in tokens.iter().zip(&sizes) {
            self.geometry.place(*token, x, (height - h) / 2.0);
            x += w + gap;
        }
        let width = if tokens.is_empty() { 0.0 } else { x - gap };
        self.geometry.set_size(row, width, height);
        (width, height)
    }
}
