use super::chromosome::Chromosome;

/// Pre-order tree visitor; the boundary to renderers and exporters.
///
/// `enter` is called for a node before its children, `leave` after the
/// last node of its subtree.
pub trait TreeVisitor {
    fn enter(&mut self, chromosome: &Chromosome, index: usize);

    fn leave(&mut self, _chromosome: &Chromosome, _index: usize) {}
}

/// Renders a tree as an S-expression such as `(Add 3 (Mul arg0 arg0))`
#[derive(Debug, Default)]
pub struct FormulaWriter {
    out: String,
}

impl FormulaWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl TreeVisitor for FormulaWriter {
    fn enter(&mut self, chromosome: &Chromosome, index: usize) {
        if index > 0 {
            self.out.push(' ');
        }
        let is_leaf = chromosome.size(index) == 1;
        if !is_leaf {
            self.out.push('(');
        }
        if let Some(node) = chromosome.node(index) {
            self.out.push_str(node.name());
        }
    }

    fn leave(&mut self, chromosome: &Chromosome, index: usize) {
        if chromosome.size(index) > 1 {
            self.out.push(')');
        }
    }
}

pub fn to_formula(chromosome: &Chromosome) -> String {
    let mut writer = FormulaWriter::new();
    chromosome.walk(&mut writer);
    writer.finish()
}

/// Formula cut to `max_len` characters, for log lines
pub fn to_formula_short(chromosome: &Chromosome, max_len: usize) -> String {
    let formula = to_formula(chromosome);
    if formula.chars().count() <= max_len {
        return formula;
    }
    let cut: String = formula.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
}

/// Counts nodes per name
#[derive(Debug, Default)]
pub struct NodeCounter {
    pub counts: std::collections::BTreeMap<String, usize>,
}

impl TreeVisitor for NodeCounter {
    fn enter(&mut self, chromosome: &Chromosome, index: usize) {
        if let Some(node) = chromosome.node(index) {
            *self.counts.entry(node.name().to_string()).or_insert(0) += 1;
        }
    }
}
