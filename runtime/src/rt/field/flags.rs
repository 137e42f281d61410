use std::fmt::Display;

/// Access flags of a field as found in the class file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldFlags(u16);

impl FieldFlags {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const VOLATILE: u16 = 0x0040;
    pub const TRANSIENT: u16 = 0x0080;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ENUM: u16 = 0x4000;

    /// Flags reported through reflection and the debugger. Anything else a
    /// class file sets is ignored.
    pub const RECOGNIZED_MODIFIERS: u16 = Self::PUBLIC
        | Self::PRIVATE
        | Self::PROTECTED
        | Self::STATIC
        | Self::FINAL
        | Self::VOLATILE
        | Self::TRANSIENT
        | Self::SYNTHETIC
        | Self::ENUM;

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    const fn has(self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    pub const fn is_public(self) -> bool {
        self.has(Self::PUBLIC)
    }

    pub const fn is_private(self) -> bool {
        self.has(Self::PRIVATE)
    }

    pub const fn is_static(self) -> bool {
        self.has(Self::STATIC)
    }

    pub const fn is_final(self) -> bool {
        self.has(Self::FINAL)
    }

    pub const fn is_volatile(self) -> bool {
        self.has(Self::VOLATILE)
    }

    pub const fn is_transient(self) -> bool {
        self.has(Self::TRANSIENT)
    }

    pub const fn is_synthetic(self) -> bool {
        self.has(Self::SYNTHETIC)
    }

    pub const fn get_raw(self) -> u16 {
        self.0
    }

    pub const fn recognized(self) -> i32 {
        (self.0 & Self::RECOGNIZED_MODIFIERS) as i32
    }
}

impl Display for FieldFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            (Self::PUBLIC, "public"),
            (Self::PRIVATE, "private"),
            (Self::PROTECTED, "protected"),
            (Self::STATIC, "static"),
            (Self::FINAL, "final"),
            (Self::VOLATILE, "volatile"),
            (Self::TRANSIENT, "transient"),
            (Self::SYNTHETIC, "synthetic"),
            (Self::ENUM, "enum"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.has(flag) {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_mask() {
        assert_eq!(FieldFlags::RECOGNIZED_MODIFIERS, 0x50DF);
        // ACC_MANDATED-like bits outside the mask are dropped
        assert_eq!(FieldFlags::new(0x8041).recognized(), 0x0041);
    }

    #[test]
    fn display_lists_set_flags() {
        let flags = FieldFlags::new(FieldFlags::PRIVATE | FieldFlags::VOLATILE);
        assert!(flags.is_volatile());
        assert!(!flags.is_static());
        assert_eq!(flags.to_string(), "private volatile");
    }
}
