//! Typed child accessors, one set per grammar rule.

use crate::{NodeRef, Rule};

macro_rules! define_accessors {
    ($(($variant:ident, $name:ident, $snake:ident)),* $(,)?) => { paste::paste! {
        impl<'a> NodeRef<'a> {
            $(
                #[doc = concat!("Returns the first `", stringify!($name), "` child.")]
                #[inline]
                pub fn $snake(self) -> Option<NodeRef<'a>> {
                    self.child_of(Rule::$variant, 0)
                }

                #[doc = concat!("Returns the `i`th `", stringify!($name), "` child.")]
                #[inline]
                pub fn [<$snake _at>](self, i: usize) -> Option<NodeRef<'a>> {
                    self.child_of(Rule::$variant, i)
                }

                #[doc = concat!("Returns all `", stringify!($name), "` children.")]
                #[inline]
                pub fn [<$snake _all>](self) -> impl Iterator<Item = NodeRef<'a>> {
                    self.children_of(Rule::$variant)
                }
            )*
        }
    }};
}

crate::for_each_rule!(define_accessors);

#[cfg(test)]
mod tests {
    use crate::{Rule, tree::tests::sample};

    #[test]
    fn generated_accessors() {
        let cst = sample();
        let root = cst.root();
        let outer = root.expression().unwrap();
        assert_eq!(outer.expression().unwrap().text(), "a");
        assert!(outer.expression_at(1).is_none());
        assert_eq!(root.expression_all().count(), 1);
        assert_eq!(root.block().map(|b| b.rule()), Some(Rule::Block));
        assert!(root.contract_definition().is_none());
    }
}
