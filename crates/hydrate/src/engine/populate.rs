use super::{Decode, EntityKey, PlanEntry, QuickPopulators};
use crate::Instance;

use hydrate_core::{
    err,
    schema::{Entity, PropertyTy},
    stmt::{Value, ValueRecord},
    Error, Result,
};

/// Writes decoded row values into instance storage, following a plan.
pub(crate) struct Populator<'a, D> {
    decoder: &'a D,
    entity: &'a Entity,
    plan: &'a QuickPopulators,
}

impl<'a, D: Decode> Populator<'a, D> {
    pub(crate) fn new(decoder: &'a D, entity: &'a Entity, plan: &'a QuickPopulators) -> Self {
        Populator {
            decoder,
            entity,
            plan,
        }
    }

    /// Decodes the identity key columns of `row`.
    pub(crate) fn decode_key(&self, row: &ValueRecord) -> Result<EntityKey> {
        let values = self
            .entity
            .primary_key_properties()
            .zip(self.plan.key_positions())
            .map(|(property, position)| -> Result<Value> {
                let column = property
                    .as_simple()
                    .ok_or_else(|| err!("primary key property `{}` is not simple", property.name))?;
                self.decoder.decode(row, *position, column)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EntityKey::new(self.entity.id, values))
    }

    /// Populates a freshly allocated instance.
    ///
    /// Key attributes are taken from `key` instead of being decoded again.
    /// On error the instance is left partially populated and must be
    /// discarded.
    pub(crate) fn populate(
        &self,
        instance: &mut Instance,
        row: &ValueRecord,
        key: &EntityKey,
    ) -> Result<()> {
        for entry in self.plan.entries() {
            let value = match entry.key_slot {
                Some(slot) => key.values[slot].clone(),
                None => self.decode(entry, row)?,
            };

            instance.load_attr(entry.property, value);
        }

        Ok(())
    }

    /// Overwrites the non-key attributes of an existing instance.
    ///
    /// Every value is decoded before the first write, so a failing row
    /// leaves the instance untouched.
    pub(crate) fn refresh(&self, instance: &mut Instance, row: &ValueRecord) -> Result<()> {
        let values = self
            .plan
            .entries()
            .iter()
            .filter(|entry| entry.key_slot.is_none())
            .map(|entry| -> Result<_> { Ok((entry.property, self.decode(entry, row)?)) })
            .collect::<Result<Vec<_>>>()?;

        for (index, value) in values {
            instance.load_attr(index, value);
        }

        Ok(())
    }

    /// Decodes the value of one property.
    fn decode(&self, entry: &PlanEntry, row: &ValueRecord) -> Result<Value> {
        let property = self.entity.property(entry.property);

        match &property.ty {
            PropertyTy::Simple(column) => self.decoder.decode(row, entry.positions[0], column),
            PropertyTy::Composite(composite) => {
                let values = composite
                    .columns
                    .iter()
                    .zip(&entry.positions)
                    .map(|(column, position)| self.decoder.decode(row, *position, column))
                    .collect::<Result<Vec<_>>>()?;

                composite
                    .construct(values)
                    .map_err(|err| err.context(Error::composition(&self.entity.name, &property.name)))
            }
        }
    }
}
