use syn::visit::{self, Visit};

pub(crate) struct MethodDecl<'ast> {
    pub name: String,
    pub receiver: &'ast syn::Type,
}

/// One walk over a file: type declarations and impl-block functions, in source
/// order, including those nested in inline modules.
#[derive(Default)]
pub(crate) struct DeclCollector<'ast> {
    pub types: Vec<String>,
    pub methods: Vec<MethodDecl<'ast>>,
}

impl<'ast> DeclCollector<'ast> {
    pub fn collect(&mut self, file: &'ast syn::File) {
        self.visit_file(file);
    }
}

impl<'ast> Visit<'ast> for DeclCollector<'ast> {
    fn visit_item_struct(&mut self, i: &'ast syn::ItemStruct) {
        self.types.push(i.ident.to_string());
        visit::visit_item_struct(self, i);
    }

    fn visit_item_enum(&mut self, i: &'ast syn::ItemEnum) {
        self.types.push(i.ident.to_string());
        visit::visit_item_enum(self, i);
    }

    fn visit_item_union(&mut self, i: &'ast syn::ItemUnion) {
        self.types.push(i.ident.to_string());
        visit::visit_item_union(self, i);
    }

    fn visit_item_type(&mut self, i: &'ast syn::ItemType) {
        self.types.push(i.ident.to_string());
        visit::visit_item_type(self, i);
    }

    fn visit_item_impl(&mut self, i: &'ast syn::ItemImpl) {
        for item in &i.items {
            if let syn::ImplItem::Fn(f) = item {
                self.methods.push(MethodDecl {
                    name: f.sig.ident.to_string(),
                    receiver: &i.self_ty,
                });
            }
        }
        visit::visit_item_impl(self, i);
    }
}
