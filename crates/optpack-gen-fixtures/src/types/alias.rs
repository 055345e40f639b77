pub type HiddenTypeAlias = super::subpackage::Hidden;
