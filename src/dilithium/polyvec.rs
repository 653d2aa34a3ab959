use crate::dilithium::poly::Poly;
use crate::dilithium::{K, L};


/// Vector of L polynomials (the "short" side of the public matrix).
#[derive(Clone, Copy, Default)]
pub(crate) struct PolyVecL {
    pub(crate) vec: [Poly; L],
}


/// Vector of K polynomials (the "tall" side of the public matrix).
#[derive(Clone, Copy, Default)]
pub(crate) struct PolyVecK {
    pub(crate) vec: [Poly; K],
}


impl PolyVecL {
    pub(crate) fn freeze(&mut self) { self.vec.iter_mut().for_each(Poly::freeze); }

    pub(crate) fn ntt(&mut self) { self.vec.iter_mut().for_each(Poly::ntt); }

    #[must_use]
    pub(crate) fn add(&self, other: &Self) -> Self {
        let mut w = PolyVecL::default();
        for i in 0..L {
            w.vec[i] = self.vec[i].add(&other.vec[i]);
        }
        w
    }

    /// True if any polynomial in the vector violates the norm bound.
    pub(crate) fn chknorm(&self, bound: u32) -> bool {
        self.vec.iter().any(|p| p.chknorm(bound))
    }

    /// Pointwise multiply two vectors in the NTT domain, divide by the
    /// Montgomery factor, and accumulate into a single polynomial. Input
    /// coefficients must be below 22Q; output stays below 2·L·Q.
    #[must_use]
    pub(crate) fn pointwise_acc_invmontgomery(u: &Self, v: &Self) -> Poly {
        let mut w = Poly::default();
        for i in 0..L {
            let t = Poly::pointwise_invmontgomery(&u.vec[i], &v.vec[i]);
            w = w.add(&t);
        }
        w
    }
}


impl PolyVecK {
    pub(crate) fn reduce(&mut self) { self.vec.iter_mut().for_each(Poly::reduce); }

    pub(crate) fn csubq(&mut self) { self.vec.iter_mut().for_each(Poly::csubq); }

    pub(crate) fn freeze(&mut self) { self.vec.iter_mut().for_each(Poly::freeze); }

    pub(crate) fn ntt(&mut self) { self.vec.iter_mut().for_each(Poly::ntt); }

    pub(crate) fn invntt_montgomery(&mut self) {
        self.vec.iter_mut().for_each(Poly::invntt_montgomery);
    }

    pub(crate) fn shiftl(&mut self) { self.vec.iter_mut().for_each(Poly::shiftl); }

    #[must_use]
    pub(crate) fn add(&self, other: &Self) -> Self {
        let mut w = PolyVecK::default();
        for i in 0..K {
            w.vec[i] = self.vec[i].add(&other.vec[i]);
        }
        w
    }

    #[must_use]
    pub(crate) fn sub(&self, other: &Self) -> Self {
        let mut w = PolyVecK::default();
        for i in 0..K {
            w.vec[i] = self.vec[i].sub(&other.vec[i]);
        }
        w
    }

    /// True if any polynomial in the vector violates the norm bound.
    pub(crate) fn chknorm(&self, bound: u32) -> bool {
        self.vec.iter().any(|p| p.chknorm(bound))
    }

    #[must_use]
    pub(crate) fn power2round(&self) -> (Self, Self) {
        let (mut v1, mut v0) = (PolyVecK::default(), PolyVecK::default());
        for i in 0..K {
            let (hi, lo) = self.vec[i].power2round();
            v1.vec[i] = hi;
            v0.vec[i] = lo;
        }
        (v1, v0)
    }

    #[must_use]
    pub(crate) fn decompose(&self) -> (Self, Self) {
        let (mut v1, mut v0) = (PolyVecK::default(), PolyVecK::default());
        for i in 0..K {
            let (hi, lo) = self.vec[i].decompose();
            v1.vec[i] = hi;
            v0.vec[i] = lo;
        }
        (v1, v0)
    }

    /// Hint vector plus the total number of set hint bits.
    pub(crate) fn make_hint(v0: &Self, v1: &Self) -> (Self, u32) {
        let mut h = PolyVecK::default();
        let mut s = 0;
        for i in 0..K {
            let (hp, hs) = Poly::make_hint(&v0.vec[i], &v1.vec[i]);
            h.vec[i] = hp;
            s += hs;
        }
        (h, s)
    }

    #[must_use]
    pub(crate) fn use_hint(&self, hint: &Self) -> Self {
        let mut w = PolyVecK::default();
        for i in 0..K {
            w.vec[i] = self.vec[i].use_hint(&hint.vec[i]);
        }
        w
    }
}
