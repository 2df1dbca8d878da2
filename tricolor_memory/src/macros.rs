/// Convenient macro for defining heap methods
/// that allocate and initialize new objects.
/// For each method, this macro generates the method itself,
/// which returns a handle to an unrooted object,
/// and a method that also references the new object from a given frame.
macro_rules! alloc_methods
{
    (
        #![doc = $impl_doc:expr]
        $(
            $(#[doc = $doc:expr])*
            #[rooted_alias = $rooted_name:ident]
            pub fn $alloc_name:ident(
                &mut $self_name:ident
                $(, $param_name:ident: $param_type:ty)*
                $(,)?
            ) -> Result<ObjectRef<'h>, $error_type:ty>
            $body:block
        )*
    ) => {
        #[doc = "Methods for creating"]
        #[doc = $impl_doc]
        #[doc = "on the heap."]
        impl<'h> $crate::heap::Heap<'h>
        {
            $(
                $(#[doc = $doc])*
                pub fn $alloc_name(
                    &mut $self_name,
                    $($param_name: $param_type),*
                ) -> Result<$crate::heap::ObjectRef<'h>, $error_type>
                $body

                $(#[doc = $doc])*
                #[doc = ""]
                #[doc = "The new object is referenced from the given frame."]
                #[doc = "If either step fails, neither takes place."]
                pub fn $rooted_name(
                    &mut $self_name,
                    frame: $crate::heap::FrameRef<'h>,
                    $($param_name: $param_type),*
                ) -> Result<$crate::heap::ObjectRef<'h>, $crate::error::Error>
                {
                    $self_name.reserve_root(frame)?;
                    let object = $self_name.$alloc_name($($param_name),*)?;
                    $self_name.reference_reserved(frame, object);
                    Ok(object)
                }
            )*
        }
    };
}
